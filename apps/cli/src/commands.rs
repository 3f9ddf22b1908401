use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use strikeline_contracts::{
    candidate_plan, spot_from_f64, Candidate, ChainScan, FixedSpotPrice, LadderGenerator, Leg,
    OptionChainScanner, OptionRight, ProfileSource, ProfileTable, SpotOrigin, StrikeLadder,
    SymbolProfile,
};

use crate::config::Config;
use crate::main_lib::{build_resolver, shutdown_token};

pub struct ScanArgs {
    pub symbols: Vec<String>,
    pub catalog: PathBuf,
    pub expiry: NaiveDate,
    pub spot: Option<Decimal>,
    pub half_width: Option<u32>,
}

#[derive(Serialize)]
struct PlanView<'a> {
    symbol: &'a str,
    source: &'static str,
    underlying: Vec<Candidate>,
    option: Vec<Candidate>,
}

#[derive(Serialize)]
struct CatalogView<'a> {
    profiles: Vec<&'a SymbolProfile>,
}

pub fn ladder(
    profiles: &Arc<ProfileTable>,
    symbol: &str,
    spot: f64,
    half_width: u32,
    json: bool,
) -> anyhow::Result<()> {
    let spot = spot_from_f64(spot)?;
    let ladder = LadderGenerator::new(profiles.clone()).generate(symbol, spot, half_width)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ladder)?);
    } else {
        print!("{}", render_ladder(&ladder));
    }
    Ok(())
}

pub fn plan(
    profiles: &ProfileTable,
    config: &Config,
    symbol: &str,
    json: bool,
) -> anyhow::Result<()> {
    let lookup = profiles.lookup(symbol);
    let view = PlanView {
        symbol: &lookup.profile.name,
        source: match lookup.source {
            ProfileSource::Configured => "configured",
            ProfileSource::Defaulted => "defaulted",
        },
        underlying: candidate_plan(&lookup.profile, Leg::Underlying),
        option: candidate_plan(&lookup.profile, Leg::Option),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} ({})", view.symbol, view.source);
    println!("  underlying: {}", join_candidates(&view.underlying));
    println!("  option:     {}", join_candidates(&view.option));
    let worst = view.underlying.len().max(view.option.len()) as u32;
    println!(
        "  worst case: {} attempts, {:?}",
        worst,
        config.attempt_timeout * worst
    );
    Ok(())
}

pub fn profiles(profiles: &ProfileTable, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("{}", profiles.symbols().join(" "));
        println!("default venue: {}", profiles.default_venue());
        return Ok(());
    }
    let view = CatalogView {
        profiles: profiles.profiles(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

pub async fn resolve(
    config: &Config,
    profiles: Arc<ProfileTable>,
    catalog: &std::path::Path,
    symbol: &str,
    json: bool,
) -> anyhow::Result<()> {
    let resolver = build_resolver(config, profiles, catalog)?;
    let cancel = shutdown_token();
    let resolved = resolver
        .resolve_underlying_with_cancel(symbol, &cancel)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        println!(
            "{} -> {}@{} (con_id {}, attempt {})",
            symbol, resolved.variant, resolved.venue, resolved.contract.con_id, resolved.attempt
        );
    }
    Ok(())
}

pub async fn scan(
    config: &Config,
    profiles: Arc<ProfileTable>,
    args: ScanArgs,
    json: bool,
) -> anyhow::Result<()> {
    let resolver = build_resolver(config, profiles, &args.catalog)?;
    let scanner = OptionChainScanner::new(
        resolver,
        Arc::new(FixedSpotPrice(args.spot)),
        config.scan_config(args.half_width),
    );
    let cancel = shutdown_token();

    let scans = match args.symbols.as_slice() {
        [symbol] => vec![scanner.scan(symbol, args.expiry, &cancel).await?],
        symbols => scanner.scan_many(symbols, args.expiry, &cancel).await,
    };
    if scans.is_empty() {
        anyhow::bail!("No symbol could be scanned");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&scans)?);
    } else {
        for scan in &scans {
            print!("{}", render_scan(scan));
        }
    }
    Ok(())
}

fn join_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// One strike per line, ATM marked with `*`.
fn render_ladder(ladder: &StrikeLadder) -> String {
    let mut out = String::new();
    for (i, strike) in ladder.iter().enumerate() {
        let marker = if i == ladder.atm_index { '*' } else { ' ' };
        let _ = writeln!(out, "{} {}", marker, strike);
    }
    out
}

fn render_scan(scan: &ChainScan) -> String {
    let origin = match scan.spot.origin {
        SpotOrigin::Live => "live",
        SpotOrigin::Nominal => "nominal",
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} spot {} ({}) via {}@{}",
        scan.symbol,
        scan.expiry.format("%Y%m%d"),
        scan.spot.price,
        origin,
        scan.underlying.variant,
        scan.underlying.venue
    );
    for (i, strike) in scan.ladder.iter().enumerate() {
        let marker = if i == scan.ladder.atm_index { '*' } else { ' ' };
        let leg = |right: OptionRight| {
            scan.option_at(*strike, right)
                .map(|o| format!("{}@{}", o.variant, o.venue))
                .unwrap_or_else(|| "-".to_string())
        };
        let _ = writeln!(
            out,
            "{} {:>10}  C {:<14} P {}",
            marker,
            strike.to_string(),
            leg(OptionRight::Call),
            leg(OptionRight::Put)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_ladder_marks_atm() {
        let ladder = StrikeLadder {
            symbol: "QQQ".to_string(),
            strikes: vec![dec!(436), dec!(437), dec!(438)],
            atm_index: 1,
        };
        assert_eq!(render_ladder(&ladder), "  436\n* 437\n  438\n");
    }

    #[test]
    fn test_join_candidates() {
        let plan = candidate_plan(&ProfileTable::builtin().profile_for("NDX"), Leg::Underlying);
        assert_eq!(join_candidates(&plan), "NDX@NASDAQ -> NDX@SMART");
    }
}
