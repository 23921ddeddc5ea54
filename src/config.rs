include!(concat!(env!("OUT_DIR"), "/iq_config.rs"));

/// Text that marks a settings entry as belonging to the module, whatever
/// drive or parent folder precedes it.
pub fn module_sentinel() -> String {
    format!("/{MODULE_SUBPATH}")
}

/// Key line prefix, `AdditionalPaths=` for Slicer.
pub fn paths_key_prefix() -> String {
    format!("{PATHS_KEY}=")
}
