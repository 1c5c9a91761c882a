//! Thin wrappers over the `docker` command line.

use std::process::Output;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};

async fn docker(args: &[&str]) -> HarnessResult<Output> {
    debug!(?args, "running docker");

    Command::new("docker")
        .args(args)
        .output()
        .await
        .map_err(|source| HarnessError::Command {
            command: args.join(" "),
            source,
        })
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

/// Whether `image` is present in the local image store.
pub async fn image_present(image: &str) -> HarnessResult<bool> {
    let output = docker(&["images", "--no-trunc"]).await?;
    if !output.status.success() {
        return Err(HarnessError::ImageCheck {
            image: image.to_string(),
            output: combined(&output),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).contains(image))
}

pub async fn pull(image: &str) -> HarnessResult<()> {
    info!(image, "pulling image");

    let output = docker(&["pull", image]).await?;
    if !output.status.success() {
        return Err(HarnessError::Pull {
            image: image.to_string(),
            output: combined(&output),
        });
    }

    Ok(())
}

/// Pulls `image` unless it is already present.
pub async fn ensure_image(image: &str) -> HarnessResult<()> {
    if image_present(image).await? {
        return Ok(());
    }

    pull(image).await
}

/// Starts a detached, self-removing container and returns its id.
pub async fn run(image: &str) -> HarnessResult<String> {
    let output = docker(&["run", "-d", "--rm", image]).await?;
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() || id.is_empty() {
        return Err(HarnessError::Start {
            image: image.to_string(),
            output: combined(&output),
        });
    }
    info!(image, container = %id, "container started");

    Ok(id)
}

pub async fn kill(container: &str) -> HarnessResult<()> {
    let output = docker(&["kill", container]).await?;
    if !output.status.success() {
        return Err(HarnessError::Teardown {
            container: container.to_string(),
            output: combined(&output),
        });
    }
    info!(container, "container killed");

    Ok(())
}

/// Returns the IP address docker assigned to `container`.
pub async fn inspect_ip(container: &str) -> HarnessResult<String> {
    let output = docker(&["inspect", container]).await?;
    let ip = parse_inspect(&output.stdout)?;

    if ip.is_empty() {
        return Err(HarnessError::NoAddress {
            container: container.to_string(),
        });
    }

    Ok(ip)
}

#[derive(Deserialize)]
struct Inspected {
    #[serde(rename = "NetworkSettings")]
    network_settings: NetworkSettings,
}

#[derive(Deserialize)]
struct NetworkSettings {
    #[serde(rename = "IPAddress", default)]
    ip_address: String,
}

/// Extracts `[0].NetworkSettings.IPAddress` from `docker inspect` output.
///
/// An empty string is returned when the container has no address.
fn parse_inspect(stdout: &[u8]) -> HarnessResult<String> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(HarnessError::EmptyInspect);
    }

    let inspected: Vec<Inspected> = serde_json::from_slice(stdout)?;

    Ok(inspected
        .into_iter()
        .next()
        .map(|entry| entry.network_settings.ip_address)
        .unwrap_or_default())
}
