//! kubectl against an EKS cluster.

use anyhow::Result;

use crate::cli::{KubectlArgs, KubectlCommand};
use crate::config::GantryConfig;
use crate::modules::kubectl::{Kubectl, KubectlCli};
use crate::paths;

pub fn run(cmd: KubectlCommand) -> Result<()> {
    match cmd {
        KubectlCommand::Exec { common, args } => {
            println!("{}", cli(&common)?.exec(&args)?);
            Ok(())
        }
        KubectlCommand::Shell { common } => Ok(cli(&common)?.debug_shell()?),
    }
}

fn cli(args: &KubectlArgs) -> Result<KubectlCli> {
    let config = GantryConfig::load()?;
    Ok(Kubectl::new(paths::expand(&args.kubeconfig)).eks(
        Box::new(config.engine()?),
        paths::expand(&args.aws_credentials),
        args.aws_config.as_deref().map(paths::expand),
        &args.profile,
    ))
}
