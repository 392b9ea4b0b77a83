/// Encrypted-device mapping table consulted at preflight
pub const CRYPTTAB: &str = "/etc/crypttab";

/// System-wide configuration override (takes precedence)
pub const SYSTEM_CONFIG: &str = "/etc/cryptboot.toml";

/// Configuration override looked up next to the installed binary
pub const LOCAL_CONFIG_NAME: &str = "cryptboot.toml";

/// Secure Boot signing helper invoked on the installed loader binary
pub const SIGN_HELPER: &str = "cryptboot-efikeys";
