//! Built-in sample services for demos and smoke tests

use svc_router_common::ServiceDescriptor;

pub fn sample_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor {
            id: "weather_service".to_string(),
            name: "Weather Service".to_string(),
            url: "https://api.open-meteo.com/v1/forecast".to_string(),
            method: "GET".to_string(),
            description: "Get weather forecast for a location (requires latitude, longitude)"
                .to_string(),
            input_params: vec![
                "latitude".to_string(),
                "longitude".to_string(),
                "current".to_string(),
            ],
            output_params: vec!["current".to_string(), "timezone".to_string()],
            ..ServiceDescriptor::default()
        },
        ServiceDescriptor {
            id: "user_service".to_string(),
            name: "User Service".to_string(),
            url: "https://jsonplaceholder.typicode.com/users".to_string(),
            method: "GET".to_string(),
            description: "Get user information by ID".to_string(),
            input_params: vec!["id".to_string()],
            output_params: vec![
                "id".to_string(),
                "name".to_string(),
                "email".to_string(),
                "phone".to_string(),
                "company".to_string(),
            ],
            ..ServiceDescriptor::default()
        },
        ServiceDescriptor {
            id: "post_service".to_string(),
            name: "Post Service".to_string(),
            url: "https://jsonplaceholder.typicode.com/posts".to_string(),
            method: "GET".to_string(),
            description: "Get posts by user ID".to_string(),
            input_params: vec!["userId".to_string()],
            output_params: vec![
                "id".to_string(),
                "title".to_string(),
                "body".to_string(),
                "userId".to_string(),
            ],
            ..ServiceDescriptor::default()
        },
        ServiceDescriptor {
            id: "comment_service".to_string(),
            name: "Comment Service".to_string(),
            url: "https://jsonplaceholder.typicode.com/comments".to_string(),
            method: "GET".to_string(),
            description: "Get comments by post ID".to_string(),
            input_params: vec!["postId".to_string()],
            output_params: vec![
                "id".to_string(),
                "name".to_string(),
                "email".to_string(),
                "body".to_string(),
            ],
            ..ServiceDescriptor::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_ids_are_unique() {
        let services = sample_services();
        let mut ids: Vec<_> = services.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), services.len());
    }
}
