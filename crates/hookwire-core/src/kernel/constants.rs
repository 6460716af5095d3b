/// Log target used for every record emitted by the dispatch core
pub const LOG_TAG: &str = "PluginHook";

/// Attribution used when the host does not supply its own package name
pub const DEFAULT_ATTRIBUTION: &str = "com.android.systemui";

/// Host class owning the plugin-creation entry point
pub const PLUGIN_FACTORY_CLASS: &str = "com.android.systemui.shared.plugins.PluginInstance$PluginFactory";

/// Method on [`PLUGIN_FACTORY_CLASS`] that creates a plugin's context
pub const PLUGIN_CONTEXT_METHOD: &str = "createPluginContext";

/// Fully qualified entry point observed by the hook adapter
pub const PLUGIN_CONTEXT_ENTRY_POINT: &str =
    "com.android.systemui.shared.plugins.PluginInstance$PluginFactory#createPluginContext";
