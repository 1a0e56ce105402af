// ==========================================
// Automatic pricing integration tests
// ==========================================
// Bulk apply-pricing over parsed rows + the live preview endpoint,
// which must be bit-identical to the batch path.
// ==========================================

mod test_helpers;

use test_helpers::{create_api, create_test_db};
use vendi_backoffice::domain::account::PricingConfig;
use vendi_backoffice::domain::product_import::ProductImportOptions;
use vendi_backoffice::domain::types::{RoundingMode, SourceKind};
use vendi_backoffice::logging;

#[tokio::test]
async fn test_apply_pricing_rewrites_rows_in_place() {
    // Scenario: cost "10,00", markup 35%, up_9_90 -> raw 13.50 -> 19.90
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    api.save_pricing_config(
        1,
        &PricingConfig {
            markup_percent: 35.0,
            rounding_mode: RoundingMode::Up990,
            use_csv_cost_when_missing: true,
        },
    )
    .unwrap();

    let csv = "nome,quantidade_estoque,preco_custo,preco_venda\n\
               Camisa,5,\"10,00\",\n\
               Sem Custo,2,,\"15,00\"\n";
    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    let priced = api.apply_pricing(1, import.id).await.unwrap();

    let camisa = &priced.parsed_data[0];
    assert_eq!(camisa.sale_price, Some(19.90));
    assert_eq!(camisa.sale_price_auto, Some(true));

    // No positive cost: flagged, never defaulted to zero, and the
    // CSV-provided price survives.
    let sem_custo = &priced.parsed_data[1];
    assert_eq!(sem_custo.sale_price, Some(15.0));
    assert_eq!(sem_custo.sale_price_auto, Some(false));
}

#[tokio::test]
async fn test_priced_rows_flow_into_products() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    api.save_pricing_config(
        1,
        &PricingConfig {
            markup_percent: 35.0,
            rounding_mode: RoundingMode::Down990,
            use_csv_cost_when_missing: true,
        },
    )
    .unwrap();

    let csv = "nome,quantidade_estoque,preco_custo\nJaqueta,1,\"41,85\"\n";
    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    api.apply_pricing(1, import.id).await.unwrap();
    api.process_import(1, import.id, 1).await.unwrap();

    let products = api.imported_products(1, import.id).unwrap();
    // raw 56.50 -> down_9_90 -> 49.90
    assert_eq!(products[0].base_price, Some(49.90));
    assert_eq!(products[0].cost_price, Some(41.85));
}

#[tokio::test]
async fn test_calculate_prices_endpoint_matches_batch_path() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let costs = vec![
        "41,85".to_string(),
        "10.00".to_string(),
        "".to_string(),
        "abc".to_string(),
    ];
    let prices = api.calculate_prices(&costs, 35.0, RoundingMode::Up990);

    assert_eq!(prices, vec![Some(59.90), Some(19.90), None, None]);
}

#[tokio::test]
async fn test_pricing_defaults_without_config_row() {
    // No account_configs row: markup 35, up_9_90.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let pricing = api.pricing_config(1).await.unwrap();
    assert_eq!(pricing.markup_percent, 35.0);
    assert_eq!(pricing.rounding_mode, RoundingMode::Up990);
}
