//! EKS cluster lifecycle commands.

use anyhow::Result;

use crate::cli::{EksctlArgs, EksctlCommand};
use crate::config::GantryConfig;
use crate::modules::eksctl::Eksctl;
use crate::paths;
use crate::ui;

pub fn run(cmd: EksctlCommand) -> Result<()> {
    match cmd {
        EksctlCommand::Create { common, flags } => {
            let eksctl = module(&common)?;
            super::spin("Creating cluster", "Cluster created", || eksctl.create(&flags))
        }
        EksctlCommand::Delete { common, flags } => {
            let eksctl = module(&common)?;
            super::spin("Deleting cluster", "Cluster deleted", || eksctl.delete(&flags))
        }
        EksctlCommand::WriteKubeconfig { common, output } => {
            let eksctl = module(&common)?;
            let dest = paths::expand(&output);
            eksctl.write_kubeconfig(&dest)?;
            ui::success(&format!("Kubeconfig written to {}", dest.display()));
            Ok(())
        }
        EksctlCommand::Exec { common, args } => {
            let eksctl = module(&common)?;
            println!("{}", eksctl.exec(&args)?);
            Ok(())
        }
    }
}

fn module(args: &EksctlArgs) -> Result<Eksctl> {
    let config = GantryConfig::load()?;
    Ok(Eksctl::new(
        Box::new(config.engine()?),
        &args.version,
        paths::expand(&args.aws_credentials),
        args.aws_config.as_deref().map(paths::expand),
        &args.profile,
        paths::expand(&args.cluster),
    ))
}
