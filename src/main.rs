// ==========================================
// Vendi Backoffice - CLI entry point
// ==========================================
// Thin shell over the ImportApi for local/backoffice use:
//   vendi-backoffice import <csv|xml> <file> [--mode M] [--ignore-errors]
//                    [--auto-sku] [--process]
//   vendi-backoffice process <import_id>
//   vendi-backoffice revert <import_id>
//   vendi-backoffice price <cost> <markup> <mode>
// Account/user come from --account/--user (default 1).
// ==========================================

use std::process::ExitCode;

use vendi_backoffice::api::ImportApi;
use vendi_backoffice::domain::product_import::ProductImportOptions;
use vendi_backoffice::domain::types::{
    ImportMode, NameNormalization, RoundingMode, SkuMode, SourceKind,
};
use vendi_backoffice::logging;

// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--mode", "--normalize", "--sku-mode", "--db", "--account", "--user"];

fn main() -> ExitCode {
    logging::init();

    tracing::info!("{} v{}", vendi_backoffice::APP_NAME, vendi_backoffice::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("erro: runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("erro: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let account_id = flag_value(&args, "--account")
        .map(|v| v.parse::<i64>())
        .transpose()?
        .unwrap_or(1);
    let user_id = flag_value(&args, "--user")
        .map(|v| v.parse::<i64>())
        .transpose()?
        .unwrap_or(1);

    let db_path = flag_value(&args, "--db")
        .map(String::from)
        .unwrap_or_else(default_db_path);
    let positional = positional_args(&args);

    match command.as_str() {
        "import" => {
            let &[kind, file] = positional.as_slice() else {
                return Err("uso: import <csv|xml> <arquivo>".into());
            };
            let source_kind = SourceKind::parse(kind)
                .ok_or_else(|| format!("formato desconhecido: {}", kind))?;
            let bytes = std::fs::read(file)?;

            let options = ProductImportOptions {
                import_mode: flag_value(&args, "--mode")
                    .and_then(ImportMode::parse)
                    .unwrap_or(ImportMode::CreateOnly),
                auto_generate_sku: has_flag(&args, "--auto-sku"),
                ignore_errors: has_flag(&args, "--ignore-errors"),
                name_normalization: flag_value(&args, "--normalize")
                    .map(NameNormalization::parse)
                    .unwrap_or_default(),
                sku_generation_mode: flag_value(&args, "--sku-mode")
                    .map(SkuMode::parse)
                    .unwrap_or_default(),
            };

            let api = ImportApi::new(&db_path)?;
            ensure_seed(&db_path, account_id, user_id)?;
            let import = api
                .create_import(account_id, user_id, source_kind, options, &bytes)
                .await?;

            println!(
                "importação #{} status={} linhas={} erros={}",
                import.id,
                import.status,
                import.total_rows,
                import.import_errors.len()
            );

            if has_flag(&args, "--process") {
                let summary = api.process_import(account_id, import.id, user_id).await?;
                println!(
                    "processado={} sucesso={} falha={} status={}",
                    summary.processed_rows,
                    summary.successful_rows,
                    summary.failed_rows,
                    summary.status
                );
            }
        }
        "process" => {
            let &[id] = positional.as_slice() else {
                return Err("uso: process <import_id>".into());
            };
            let api = ImportApi::new(&db_path)?;
            let summary = api.process_import(account_id, id.parse()?, user_id).await?;
            println!(
                "processado={} sucesso={} falha={} status={}",
                summary.processed_rows,
                summary.successful_rows,
                summary.failed_rows,
                summary.status
            );
        }
        "revert" => {
            let &[id] = positional.as_slice() else {
                return Err("uso: revert <import_id>".into());
            };
            let api = ImportApi::new(&db_path)?;
            let import = api.revert_import(account_id, id.parse()?).await?;
            println!("importação #{} status={}", import.id, import.status);
        }
        "price" => {
            let &[cost, markup, mode] = positional.as_slice() else {
                return Err("uso: price <custo> <markup%> <down_9_90|up_9_90|cents_90>".into());
            };
            let rounding = RoundingMode::parse(mode)
                .ok_or_else(|| format!("modo de arredondamento desconhecido: {}", mode))?;
            let api = ImportApi::new(&db_path)?;
            let prices = api.calculate_prices(&[cost.to_string()], markup.parse()?, rounding);
            match prices.first().copied().flatten() {
                Some(price) => println!("{:.2}", price),
                None => println!("custo inválido"),
            }
        }
        _ => print_usage(),
    }

    Ok(())
}

/// Make sure the default account/user rows exist so a fresh database
/// is usable from the CLI.
fn ensure_seed(
    db_path: &str,
    account_id: i64,
    user_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = vendi_backoffice::db::open_sqlite_connection(db_path)?;
    conn.execute(
        "INSERT OR IGNORE INTO accounts (id, name) VALUES (?1, 'Conta padrão')",
        [account_id],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO users (id, account_id, name) VALUES (?1, ?2, 'Operador')",
        [user_id, account_id],
    )?;
    Ok(())
}

/// Positional arguments: everything after the command that is not a
/// flag or the value of a value-taking flag.
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next(); // skip the flag's value
        } else if !arg.starts_with("--") {
            positional.push(arg.as_str());
        }
    }
    positional
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn default_db_path() -> String {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("vendi-backoffice");
    let _ = std::fs::create_dir_all(&dir);
    dir.join("vendi.db").to_string_lossy().to_string()
}

fn print_usage() {
    println!("uso: vendi-backoffice <import|process|revert|price> [argumentos]");
    println!("  import <csv|xml> <arquivo> [--mode create_only|update_only]");
    println!("         [--ignore-errors] [--auto-sku] [--normalize MODO]");
    println!("         [--sku-mode MODO] [--process]");
    println!("  process <import_id>");
    println!("  revert <import_id>");
    println!("  price <custo> <markup%> <down_9_90|up_9_90|cents_90>");
    println!("  flags globais: --db <caminho> --account <id> --user <id>");
}
