use colored::*;
use core_claims::{AnyClaim, Assertion, Authorization, Claim, PermissionsChecker};

fn checker(model: Option<&str>) -> anyhow::Result<PermissionsChecker> {
    match model {
        Some(path) => {
            let model =
                app_utils::load_model(path).map_err(|e| anyhow::anyhow!("Invalid model: {}", e))?;
            Ok(PermissionsChecker::new(model))
        }
        None => Ok(PermissionsChecker::unconstrained()),
    }
}

/// Returns whether the assertion was granted
pub fn test(model: Option<&str>, authorization: &str, assertion: &str) -> anyhow::Result<bool> {
    let checker = checker(model)?;
    let result = checker.test(authorization, assertion)?;

    match result.failed() {
        None => println!("{} granted", "✓".green().bold()),
        Some(failed) => println!("{} denied by {}", "✗".red().bold(), failed.to_string().bold()),
    }
    Ok(result.is_success())
}

pub fn consolidate(model: Option<&str>, claims: &str, as_assertion: bool) -> anyhow::Result<()> {
    let checker = checker(model)?;

    let consolidated = if as_assertion {
        let parsed = Assertion::parse(claims)?;
        checker.validate(&parsed)?.to_string()
    } else {
        let parsed = Authorization::parse(claims)?;
        checker.validate(&parsed)?.to_string()
    };
    println!("{consolidated}");
    Ok(())
}

/// Returns whether every token is known to the model
pub fn supports(model: &str, claims: &str) -> anyhow::Result<bool> {
    let checker = checker(Some(model))?;
    let supported = checker.supports(claims);

    if supported {
        println!("{} supported", "✓".green().bold());
    } else {
        println!("{} not supported by {}", "✗".red().bold(), model);
    }
    Ok(supported)
}

pub fn inspect(claim: &str) -> anyhow::Result<()> {
    let parsed = AnyClaim::parse(claim)?;
    let base = parsed.base();

    println!("{} {}", "Claim:".bold(), parsed);
    println!("  kind:  {}", parsed.kind());
    println!("  token: {}", base.token);
    if let Some(scope) = &base.scope {
        println!("  scope: {}", scope);
    }
    match &parsed {
        AnyClaim::Assertion(assertion) if assertion.is_negative() => {
            println!("  {}", "negated".yellow());
        }
        AnyClaim::Grant(grant) => println!("  subject: {}", grant.subject),
        _ => {}
    }
    Ok(())
}
