//! Command-line surface and dispatch onto the orchestrator.

use crate::error::CliError;
use clap::{Parser, Subcommand};
use cluster_model::{ClusterSpec, Iid, NodeGroupSpec, ScalingBounds};
use provisioner::Orchestrator;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Provision managed Kubernetes clusters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a cluster and its node groups from a JSON or YAML spec
    Create {
        #[arg(long)]
        spec: PathBuf,
    },
    /// Show one cluster
    Get { cluster: String },
    /// Show every cluster that can be described
    List,
    /// Delete a cluster and wait until it is gone
    Delete { cluster: String },
    /// Start a control-plane version upgrade
    Upgrade { cluster: String, version: String },
    /// Add a node group from a JSON or YAML spec
    AddNodeGroup {
        cluster: String,
        #[arg(long)]
        spec: PathBuf,
    },
    /// Show one node group
    GetNodeGroup { cluster: String, node_group: String },
    /// Show every node group of a cluster
    ListNodeGroups { cluster: String },
    /// Remove a node group and wait until it is gone
    RemoveNodeGroup { cluster: String, node_group: String },
    /// Change the scaling bounds of a node group
    Scale {
        cluster: String,
        node_group: String,
        #[arg(long)]
        desired: u32,
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
    },
    /// Print the JSON schema of the cluster spec
    Schema,
}

/// JSON schema for cluster spec files
pub fn spec_schema() -> Result<Value, CliError> {
    to_json(&schemars::schema_for!(ClusterSpec))
}

/// Run one command and return its JSON output
pub async fn run(orchestrator: &Orchestrator, command: Command) -> Result<Value, CliError> {
    let output = match command {
        Command::Create { spec } => {
            let spec: ClusterSpec = load_spec(&spec)?;
            to_json(&orchestrator.create_cluster(&spec).await?)?
        }
        Command::Get { cluster } => to_json(&orchestrator.get_cluster(&Iid::from_name(cluster)).await?)?,
        Command::List => to_json(&orchestrator.list_clusters().await?)?,
        Command::Delete { cluster } => {
            let deleted = orchestrator.delete_cluster(&Iid::from_name(&cluster)).await?;
            json!({ "cluster": cluster, "deleted": deleted })
        }
        Command::Upgrade { cluster, version } => {
            to_json(&orchestrator.upgrade_cluster(&Iid::from_name(cluster), &version).await?)?
        }
        Command::AddNodeGroup { cluster, spec } => {
            let spec: NodeGroupSpec = load_spec(&spec)?;
            to_json(&orchestrator.add_node_group(&Iid::from_name(cluster), &spec).await?)?
        }
        Command::GetNodeGroup { cluster, node_group } => to_json(
            &orchestrator
                .get_node_group(&Iid::from_name(cluster), &Iid::from_name(node_group))
                .await?,
        )?,
        Command::ListNodeGroups { cluster } => to_json(&orchestrator.list_node_groups(&Iid::from_name(cluster)).await?)?,
        Command::RemoveNodeGroup { cluster, node_group } => {
            let removed = orchestrator
                .remove_node_group(&Iid::from_name(&cluster), &Iid::from_name(&node_group))
                .await?;
            json!({ "cluster": cluster, "nodeGroup": node_group, "deleted": removed })
        }
        Command::Scale {
            cluster,
            node_group,
            desired,
            min,
            max,
        } => to_json(
            &orchestrator
                .change_node_group_scaling(
                    &Iid::from_name(cluster),
                    &Iid::from_name(node_group),
                    ScalingBounds::new(desired, min, max),
                )
                .await?,
        )?,
        Command::Schema => spec_schema()?,
    };
    Ok(output)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

/// Read a spec file, choosing YAML or JSON by extension
pub fn load_spec<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::InvalidSpec {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_spec(path, &contents)
}

pub fn parse_spec<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T, CliError> {
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if yaml {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| CliError::InvalidSpec {
        path: path.display().to_string(),
        message,
    })
}
