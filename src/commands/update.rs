//! GitOps image bump command.

use anyhow::Result;
use containerkit::Secret;

use crate::cli::UpdateImageArgs;
use crate::config::GantryConfig;
use crate::modules::updater::{ImageUpdater, UpdateRequest};
use crate::ui;

pub fn run(args: UpdateImageArgs) -> Result<()> {
    let config = GantryConfig::load()?;
    let updater = ImageUpdater::new(Box::new(config.engine()?));

    let request = UpdateRequest {
        app: args.app,
        repo_url: args.repo,
        branch: args.branch,
        files: args.files,
        image_url: args.image,
        containers: args.containers,
        git_user: args.git_user,
        git_email: args.git_email,
        git_password: Secret::new(args.git_password),
        force_push: args.force,
    };

    updater.update(&request)?;
    ui::success(&format!("{} now points at {}", request.repo_url, request.image_url));
    Ok(())
}
