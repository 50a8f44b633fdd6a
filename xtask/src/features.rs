use std::process::Command;

use anyhow::{Context, Result};

/// `None` runs with `--no-default-features`.
const FEATURE_COMBINATIONS: &[Option<&[&str]>] = &[
    None,       // no serial backend
    Some(&[]),  // default
    Some(&["serial"]),
];

/// Check that every notifier-infra feature combination compiles.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} notifier-infra feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, combination) in FEATURE_COMBINATIONS.iter().enumerate() {
        let mut command = Command::new("cargo");
        command.arg("check").arg("-p").arg("notifier-infra").arg("--all-targets");

        let display_label = match combination {
            None => {
                command.arg("--no-default-features");
                "no-default-features".to_string()
            }
            Some(features) if features.is_empty() => "default".to_string(),
            Some(features) => {
                let joined = features.join(",");
                command.arg("--no-default-features").arg("--features").arg(&joined);
                joined
            }
        };

        println!(
            "\n[{}/{}] cargo check -p notifier-infra ({display_label})",
            index + 1,
            FEATURE_COMBINATIONS.len()
        );

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("✅ Features '{display_label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
