use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).try_init();
    });
}

/// Write `payload` to `dest` through a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn write_atomic(dest: &Path, payload: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "output".to_string());
    let tmp = dir.join(format!(".{name}.tmp"));
    {
        let mut f = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(payload).with_context(|| format!("write {}", tmp.display()))?;
        f.sync_all().ok();
    }
    if let Err(e) = fs::rename(&tmp, dest) {
        // rename over an existing file can fail on some platforms; copy instead
        tracing::debug!("rename {} -> {} failed ({}), copying", tmp.display(), dest.display(), e);
        fs::copy(&tmp, dest).with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
        fs::remove_file(&tmp).ok();
    }
    Ok(())
}
