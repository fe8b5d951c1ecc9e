use colored::*;
use core_claims::{DefinitionKind, PermissionsModel, TokenDefinition};

pub fn check(file_path: &str) -> anyhow::Result<()> {
    println!("{} {}", "Checking model:".bold(), file_path);

    let model = app_utils::load_model(file_path)
        .map_err(|e| anyhow::anyhow!("Invalid model: {}", e))?;

    println!(
        "  {} Case sensitivity: {:?}",
        "✓".green(),
        model.case_sensitivity()
    );
    println!("  {} Atoms: {}", "✓".green(), model.atoms().count());
    println!("  {} Composites: {}", "✓".green(), model.composites().count());
    println!("  {} Definitions: {}", "✓".green(), model.len());

    for definition in model.definitions() {
        print_definition(&model, definition);
    }

    // Includes already implied by a sibling include
    let mut warnings = 0;
    for definition in model.definitions() {
        for redundant in redundant_includes(&model, definition) {
            println!(
                "  {} {} includes {} more than once (directly and transitively)",
                "⚠".yellow(),
                definition.full_token(),
                redundant
            );
            warnings += 1;
        }
    }

    println!();
    if warnings == 0 {
        println!("{} Model is valid!", "✓".green().bold());
    } else {
        println!(
            "{} Model is valid with {} warning(s)",
            "⚠".yellow().bold(),
            warnings
        );
    }

    Ok(())
}

fn print_definition(model: &PermissionsModel, definition: &TokenDefinition) {
    let indent = if definition.kind() == DefinitionKind::Member {
        "      "
    } else {
        "    "
    };
    let mut line = format!("{indent}{}", definition.full_token());

    if !definition.aliases().is_empty() {
        let aliases: Vec<&str> = definition.aliases().iter().map(String::as_str).collect();
        line.push_str(&format!(" (aliases: {})", aliases.join(", ")));
    }
    if !definition.includes().is_empty() {
        let includes: Vec<String> = definition
            .includes()
            .iter()
            .filter_map(|id| model.get(*id))
            .map(|included| included.full_token().to_string())
            .collect();
        line.push_str(&format!(" -> {}", includes.join(", ")));
    }
    println!("{}", line.dimmed());
}

fn redundant_includes(model: &PermissionsModel, definition: &TokenDefinition) -> Vec<String> {
    let targets: Vec<&TokenDefinition> = definition
        .includes()
        .iter()
        .filter_map(|id| model.get(*id))
        .collect();

    targets
        .iter()
        .filter(|target| {
            targets.iter().any(|other| {
                other.id() != target.id()
                    && model.token_match(other.full_token(), target.full_token())
            })
        })
        .map(|target| target.full_token().to_string())
        .collect()
}
