use super::{parse, Chain, CommandRunner, Source};
use std::sync::Arc;

pub const ROOT_MOUNT: &str = "/";

pub fn default_chain(runner: Arc<dyn CommandRunner>) -> Chain<u8> {
    Chain::new(0).then(DfSource::new(ROOT_MOUNT, runner))
}

/// `Use%` reported by `df` for one mount point.
pub struct DfSource {
    mount: String,
    runner: Arc<dyn CommandRunner>,
}

impl DfSource {
    pub fn new(mount: &str, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            mount: mount.to_string(),
            runner,
        }
    }
}

impl Source<u8> for DfSource {
    fn name(&self) -> &str {
        "df"
    }

    fn read(&self) -> Option<u8> {
        let output = self.runner.run("df", &[self.mount.as_str()])?;
        parse::df_use_percent(&output)
    }
}
