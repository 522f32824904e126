//! Containerized Gradle builds.

use anyhow::Result;

use crate::cli::{GradleArgs, GradleCommand};
use crate::config::GantryConfig;
use crate::modules::gradle::Gradle;
use crate::paths;

pub fn run(cmd: GradleCommand) -> Result<()> {
    match cmd {
        GradleCommand::Build { common } => {
            let gradle = module(&common)?;
            super::spin("Running gradle build", "Build finished", || gradle.build())
        }
        GradleCommand::Test { common } => {
            let gradle = module(&common)?;
            super::spin("Running gradle test", "Tests finished", || gradle.test())
        }
        GradleCommand::Task { common, name, args } => {
            let gradle = module(&common)?;
            super::spin(
                &format!("Running gradle {name}"),
                &format!("Task {name} finished"),
                || gradle.task(&name, &args),
            )
        }
    }
}

fn module(args: &GradleArgs) -> Result<Gradle> {
    let config = GantryConfig::load()?;
    let mut gradle = Gradle::new(Box::new(config.engine()?))
        .from_version(&args.version)
        .with_directory(paths::expand(&args.directory));

    if let Some(image) = &args.image {
        gradle = gradle.from_image(image);
    }
    if args.wrapper {
        gradle = gradle.with_wrapper();
    }
    Ok(gradle)
}
