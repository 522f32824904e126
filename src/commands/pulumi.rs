//! Pulumi stack operations.

use anyhow::Result;
use containerkit::Secret;

use crate::cli::{PulumiArgs, PulumiCommand};
use crate::config::GantryConfig;
use crate::modules::pulumi::Pulumi;
use crate::paths;

pub fn run(cmd: PulumiCommand) -> Result<()> {
    match cmd {
        PulumiCommand::Up { common, stack } => {
            let (pulumi, dir) = module(&common)?;
            super::spin("Updating stack", "Stack updated", || pulumi.up(&dir, &stack))
        }
        PulumiCommand::Preview { common, stack } => {
            let (pulumi, dir) = module(&common)?;
            println!("{}", pulumi.preview(&dir, &stack)?);
            Ok(())
        }
        PulumiCommand::Refresh { common, stack } => {
            let (pulumi, dir) = module(&common)?;
            super::spin("Refreshing stack", "Stack refreshed", || {
                pulumi.refresh(&dir, &stack)
            })
        }
        PulumiCommand::Destroy { common, stack } => {
            let (pulumi, dir) = module(&common)?;
            super::spin("Destroying stack", "Stack destroyed", || {
                pulumi.destroy(&dir, &stack)
            })
        }
        PulumiCommand::Run { common, args } => {
            let (pulumi, dir) = module(&common)?;
            println!("{}", pulumi.run_command(&dir, &args.join(" "))?);
            Ok(())
        }
        PulumiCommand::Output {
            common,
            stack,
            property,
        } => {
            let (pulumi, dir) = module(&common)?;
            println!("{}", pulumi.output(&dir, &stack, &property)?);
            Ok(())
        }
    }
}

fn module(args: &PulumiArgs) -> Result<(Pulumi, std::path::PathBuf)> {
    let config = GantryConfig::load()?;
    let mut pulumi =
        Pulumi::new(Box::new(config.engine()?)).from_version(&args.version);

    if let Some(token) = &args.token {
        pulumi = pulumi.with_token(Secret::new(token));
    }
    if let (Some(access), Some(secret)) =
        (&args.aws_access_key_id, &args.aws_secret_access_key)
    {
        pulumi = pulumi.with_aws_credentials(Secret::new(access), Secret::new(secret));
    }
    if let Some(env) = &args.esc_env {
        pulumi = pulumi.with_esc(env);
    }
    if args.docker {
        pulumi = pulumi.with_docker();
    }

    Ok((pulumi, paths::expand(&args.directory)))
}
