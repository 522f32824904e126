//! Neon preview database commands.

use anyhow::Result;
use containerkit::Secret;

use crate::cli::{PreviewsArgs, PreviewsCommand};
use crate::config::GantryConfig;
use crate::modules::neon::NeonPreviews;
use crate::paths;
use crate::ui;

pub fn run(cmd: PreviewsCommand) -> Result<()> {
    match cmd {
        PreviewsCommand::Provision { common } => {
            let previews = module(&common)?;
            let pb = crate::progress::spinner("Provisioning preview database");
            match previews.provision(&common.branch) {
                Ok(slug) => {
                    crate::progress::finish_success(
                        &pb,
                        &format!("Preview database ready, connection string in SSM at neon-{slug}"),
                    );
                    Ok(())
                }
                Err(err) => {
                    crate::progress::finish_error(&pb, "Provisioning failed");
                    Err(err)
                }
            }
        }
        PreviewsCommand::Destroy { common } => {
            let previews = module(&common)?;
            let slug = previews.destroy(&common.branch)?;
            ui::success(&format!("Preview database {slug} destroyed"));
            Ok(())
        }
    }
}

fn module(args: &PreviewsArgs) -> Result<NeonPreviews> {
    let config = GantryConfig::load()?;
    let engine = config.engine()?;
    Ok(NeonPreviews::new(
        Box::new(engine),
        &args.project_id,
        Secret::new(&args.api_key),
        paths::expand(&args.aws_dir),
        &args.profile,
        config.neon,
    ))
}
