use std::path::{Path, PathBuf};
use std::sync::Arc;

use zettel_core::error::{Result, ZettelkastenError};
use zettel_core::route::{Route, RoutePayload, RouteWriter};
use zettel_core::vfs::FileSystem;

/// Writes every route as a pretty-printed JSON document under `out_dir`.
pub struct JsonRouteWriter {
    out_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonRouteWriter {
    pub fn new(out_dir: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { out_dir, fs }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn target(&self, route: &Route) -> PathBuf {
        self.out_dir.join(route.output_path().with_extension("json"))
    }
}

impl RouteWriter for JsonRouteWriter {
    fn write_route(&mut self, route: &Route, payload: &RoutePayload) -> Result<()> {
        let path = self.target(route);
        let json = serde_json::to_vec_pretty(payload)
            .map_err(|e| ZettelkastenError::Route(format!("{:?}: {}", route, e)))?;
        self.fs
            .write_all(&path, &json)
            .map_err(|e| ZettelkastenError::io(&path, e))?;
        log::debug!("Wrote {:?}", path);
        Ok(())
    }
}
