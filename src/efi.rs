use anyhow::Result;

use crate::cmd;

/// One NVRAM boot entry as printed by the listing tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EfiBootEntry {
    /// Four-digit-style hex id (the `0001` in `Boot0001`)
    pub id: String,
    /// Human-readable label, the matching key for cleanup
    pub label: String,
    /// Marked `*` in the listing
    pub active: bool,
}

/// Parse one listing line.
///
/// Text contract: `Boot<hexdigits>[*]<whitespace><label>`. The `*` flags
/// the active entry but does not matter for removal. Header and
/// decorative lines (`BootOrder:`, `BootCurrent:`, `Timeout:`, ...) do
/// not match and are skipped rather than treated as errors, since the
/// listing format carries lines this tool does not care about.
pub fn parse_entry(line: &str) -> Option<EfiBootEntry> {
    let rest = line.strip_prefix("Boot")?;

    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    if id.is_empty() {
        return None;
    }

    let rest = &rest[id.len()..];
    let (active, rest) = match rest.strip_prefix('*') {
        Some(r) => (true, r),
        None => (false, rest),
    };

    // At least one whitespace character must separate id and label.
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let label = rest.trim_start();
    if label.is_empty() {
        return None;
    }

    Some(EfiBootEntry {
        id,
        label: label.trim_end().to_string(),
        active,
    })
}

/// List and remove NVRAM boot entries.
pub trait BootEntryLister {
    /// Full listing output, a static snapshot of the entries present at
    /// call time.
    fn list(&self) -> Result<String>;

    /// Remove one entry by id. Irreversible.
    fn remove(&self, id: &str) -> Result<()>;
}

/// Shells out to efibootmgr.
pub struct EfiBootMgr;

impl BootEntryLister for EfiBootMgr {
    fn list(&self) -> Result<String> {
        cmd::run_output("efibootmgr", std::iter::empty::<&str>())
    }

    fn remove(&self, id: &str) -> Result<()> {
        cmd::run("efibootmgr", ["-b", id, "-B", "-q"])
    }
}

/// Remove every boot entry whose label equals `label` exactly, active
/// ones included, and return how many were removed.
///
/// The listing is taken once; entries appearing concurrently are not
/// seen. A failing removal is propagated immediately so re-registration
/// never proceeds against a broken entry set. Afterwards the entries are
/// listed again and a leftover match is logged as a warning (but not
/// retried).
pub fn remove_by_label(lister: &dyn BootEntryLister, label: &str) -> Result<usize> {
    let listing = lister.list()?;

    let mut removed = 0;
    for entry in listing.lines().filter_map(parse_entry) {
        if entry.label == label {
            println!("Removing EFI boot entry Boot{} ({})", entry.id, entry.label);
            lister.remove(&entry.id)?;
            removed += 1;
        }
    }

    if removed > 0 {
        let leftover = lister
            .list()?
            .lines()
            .filter_map(parse_entry)
            .filter(|e| e.label == label)
            .count();
        if leftover > 0 {
            tracing::warn!(
                label,
                leftover,
                "boot entries with this label remain after removal"
            );
        }
    }

    Ok(removed)
}
