//! Fuzz target for policy, model and evidence documents.
//!
//! Parsing and validation must never panic, whatever the bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tighten::{EvidenceSnapshot, PolicyConfig, SchemaModel};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = PolicyConfig::from_json(text);
    if let Ok(model) = SchemaModel::from_json(text) {
        let _ = model.validate();
    }
    if let Ok(snapshot) = EvidenceSnapshot::from_json(text) {
        let _ = snapshot.index();
    }

    // Flat `key = value` lines.
    let entries: Vec<(&str, &str)> = text
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();
    if let Ok(policy) = PolicyConfig::from_flat_map(entries) {
        let flat = policy.to_flat_map();
        let restored =
            PolicyConfig::from_flat_map(flat.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        assert!(restored.is_ok(), "exported flat policy failed to reload");
    }
});
