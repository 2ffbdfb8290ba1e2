//! In-memory registry of declared REST services
//!
//! Pure lookup table with JSON persistence. Lookups return `Option`; nothing
//! here panics or propagates an error past the load/save boundary.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use svc_router_common::ServiceDescriptor;
use tracing::{debug, info, warn};

/// Persisted form of the registry
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    services: Vec<ServiceDescriptor>,
}

/// Registry of service descriptors, keyed by id
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a descriptor. Collisions on id overwrite.
    pub fn add(&mut self, descriptor: ServiceDescriptor) {
        info!("Service registered: {} ({})", descriptor.name, descriptor.id);
        self.services.insert(descriptor.id.clone(), descriptor);
    }

    /// Remove by id. Returns whether a descriptor was actually removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.services.remove(id).is_some();
        if removed {
            info!("Service removed: {}", id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(id)
    }

    /// Case-insensitive exact match on name. Duplicate names are not
    /// prevented; the first match wins.
    pub fn get_by_name(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services
            .values()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn list(&self) -> Vec<&ServiceDescriptor> {
        self.services.values().collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Load descriptors from a JSON file, replacing current contents.
    /// A missing file yields an empty registry; malformed JSON is an error
    /// the caller reports without crashing.
    pub fn load_json(&mut self, path: &Path) -> EngineResult<()> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Registry file {} not found, starting empty", path.display());
                self.services.clear();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let file: RegistryFile = serde_json::from_str(&content)?;
        self.services = file
            .services
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        info!(
            "Loaded {} services from {}",
            self.services.len(),
            path.display()
        );
        Ok(())
    }

    pub fn save_json(&self, path: &Path) -> EngineResult<()> {
        let mut services: Vec<&ServiceDescriptor> = self.services.values().collect();
        services.sort_by(|a, b| a.id.cmp(&b.id));

        let file = serde_json::json!({ "services": services });
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        debug!("Saved {} services to {}", services.len(), path.display());
        Ok(())
    }

    /// Render every descriptor as the text block embedded in planner prompts.
    pub fn llm_context(&self) -> String {
        if self.services.is_empty() {
            return "No services currently registered.".to_string();
        }

        let mut services: Vec<&ServiceDescriptor> = self.services.values().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::from("Available services:\n");
        for (i, service) in services.iter().enumerate() {
            out.push_str(&format!("\n{}. Service Name: {}\n", i + 1, service.name));
            out.push_str(&format!("   Description: {}\n", service.description));
            out.push_str(&format!("   Method: {}\n", service.method));
            out.push_str(&format!("   URL: {}\n", service.url));
            out.push_str(&format!(
                "   Input Parameters: {}\n",
                service.input_params.join(", ")
            ));
            out.push_str(&format!(
                "   Output Parameters: {}\n",
                service.output_params.join(", ")
            ));
            if let Some(domain) = &service.domain {
                out.push_str(&format!("   Domain: {}\n", domain));
            }
            if !service.tags.is_empty() {
                out.push_str(&format!("   Tags: {}\n", service.tags.join(", ")));
            }
            if let Some(examples) = &service.example_inputs {
                out.push_str(&format!("   Example Inputs: {}\n", examples));
            }
        }
        out
    }
}
