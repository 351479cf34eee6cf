//! Atomic rewriter for `/etc/resolv.conf` (§4.2).

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

#[cfg(test)]
use std::sync::Mutex;

/// Capability surface [`crate::model::Connection::apply`]/`revert` drive to
/// rewrite the resolver file. Split out as a trait for the same reason as
/// [`crate::netlink::LinkControl`]: the object-manager logic is tested
/// without touching the real filesystem path.
#[async_trait::async_trait]
pub trait ResolvWrite: Send + Sync {
    async fn write(
        &self,
        nameservers: &[Ipv4Addr],
        domain: Option<&str>,
        searches: &[String],
    ) -> std::io::Result<()>;

    async fn erase(&self) -> std::io::Result<()>;
}

/// Real implementation: writes to a sibling temp file, then renames over
/// the target. The prior contents are never preserved — Loom is the sole
/// author of the file while it owns an active connection (§5).
pub struct ResolverWriter {
    path: PathBuf,
}

impl ResolverWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        let name = tmp
            .file_name()
            .map(|n| format!("{}.loom.tmp", n.to_string_lossy()))
            .unwrap_or_else(|| "resolv.conf.loom.tmp".to_owned());
        tmp.set_file_name(name);
        tmp
    }

    fn render(nameservers: &[Ipv4Addr], domain: Option<&str>, searches: &[String]) -> String {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut doc = format!("# Created by Loom: {now}\n");

        if let Some(domain) = domain {
            doc.push_str(&format!("domain {domain}\n"));
        }
        if !searches.is_empty() {
            doc.push_str("search ");
            doc.push_str(&searches.join(" "));
            doc.push('\n');
        }
        for ns in nameservers {
            doc.push_str(&format!("nameserver {ns}\n"));
        }

        doc
    }

    async fn atomic_write(path: &Path, tmp: &Path, contents: &str) -> std::io::Result<()> {
        {
            let mut f = tokio::fs::File::create(tmp).await?;
            use tokio::io::AsyncWriteExt;
            f.write_all(contents.as_bytes()).await?;
            f.sync_all().await?;
        }
        tokio::fs::rename(tmp, path).await
    }
}

#[async_trait::async_trait]
impl ResolvWrite for ResolverWriter {
    async fn write(
        &self,
        nameservers: &[Ipv4Addr],
        domain: Option<&str>,
        searches: &[String],
    ) -> std::io::Result<()> {
        let doc = Self::render(nameservers, domain, searches);
        Self::atomic_write(&self.path, &self.tmp_path(), &doc).await
    }

    async fn erase(&self) -> std::io::Result<()> {
        Self::atomic_write(&self.path, &self.tmp_path(), "").await
    }
}

/// In-memory double recording the last document written, for the
/// object-manager test suite.
#[cfg(test)]
#[derive(Default)]
pub struct FakeResolver {
    pub document: Mutex<Option<String>>,
}

#[cfg(test)]
impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.document.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ResolvWrite for FakeResolver {
    async fn write(
        &self,
        nameservers: &[Ipv4Addr],
        domain: Option<&str>,
        searches: &[String],
    ) -> std::io::Result<()> {
        *self.document.lock().unwrap() = Some(ResolverWriter::render(nameservers, domain, searches));
        Ok(())
    }

    async fn erase(&self) -> std::io::Result<()> {
        *self.document.lock().unwrap() = None;
        Ok(())
    }
}
