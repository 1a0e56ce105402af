// ==========================================
// Import orchestrator tests
// ==========================================
// Pre-flight gating, strict-mode early exit, duplicate handling and
// final status determination.
// ==========================================

mod test_helpers;

use test_helpers::{count_products, create_api, create_test_db, insert_product, open_conn};
use vendi_backoffice::api::ApiError;
use vendi_backoffice::domain::product_import::ProductImportOptions;
use vendi_backoffice::domain::types::{ImportMode, ImportStatus, SourceKind};
use vendi_backoffice::importer::ImportError;
use vendi_backoffice::logging;

const DUPLICATE_CSV: &str = "nome,quantidade_estoque,tamanho,marca,cor\n\
                             Camisa,2,M,Vendi,Azul\n\
                             Camisa,3,M,Vendi,Azul\n";

#[tokio::test]
async fn test_strict_mode_duplicate_rows_block_whole_run() {
    // Scenario: two rows with identical name/size/brand/color,
    // create_only, ignore_errors=false -> nothing is created.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let import = api
        .create_import(
            1,
            1,
            SourceKind::Csv,
            ProductImportOptions::default(),
            DUPLICATE_CSV.as_bytes(),
        )
        .await
        .unwrap();

    let result = api.process_import(1, import.id, 1).await;
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::BlockedByDuplicates))
    ));

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 0);

    let reloaded = api.get_import(1, import.id).unwrap();
    assert_eq!(reloaded.status, ImportStatus::Failed);
    // Both rows annotated, cross-referencing each other
    assert_eq!(reloaded.import_errors.len(), 2);
    assert!(reloaded.import_errors[0].errors[0].contains("também na linha 2"));
    assert!(reloaded.import_errors[1].errors[0].contains("também na linha 1"));
}

#[tokio::test]
async fn test_ignore_mode_duplicate_rows_fail_but_run_continues() {
    // Scenario: the same two duplicate rows plus one clean row with
    // ignore_errors=true -> duplicates recorded as failures, the
    // clean row imports, job completes.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let csv = "nome,quantidade_estoque,tamanho,marca,cor\n\
               Camisa,2,M,Vendi,Azul\n\
               Camisa,3,M,Vendi,Azul\n\
               Bermuda,1,,,\n";
    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(summary.processed_rows, 3);
    assert_eq!(summary.successful_rows, 1);
    assert_eq!(summary.failed_rows, 2);

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 1);

    let dup_errors: Vec<_> = summary
        .errors
        .iter()
        .filter(|e| e.errors[0].contains("Produto duplicado"))
        .collect();
    assert_eq!(dup_errors.len(), 2);
}

#[tokio::test]
async fn test_ignore_mode_all_rows_failed_means_failed_status() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, DUPLICATE_CSV.as_bytes())
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Failed);
    assert_eq!(summary.failed_rows, 2);
    assert_eq!(summary.successful_rows, 0);
}

#[tokio::test]
async fn test_strict_mode_parse_errors_block_processing() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let csv = "nome,quantidade_estoque\nCamisa,5\n,3\n";
    let import = api
        .create_import(
            1,
            1,
            SourceKind::Csv,
            ProductImportOptions::default(),
            csv.as_bytes(),
        )
        .await
        .unwrap();
    assert_eq!(import.status, ImportStatus::Ready);

    let result = api.process_import(1, import.id, 1).await;
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::BlockedByParseErrors))
    ));

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 0);
    assert_eq!(
        api.get_import(1, import.id).unwrap().status,
        ImportStatus::Failed
    );
}

#[tokio::test]
async fn test_strict_mode_first_row_failure_aborts_early() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_conn(&db_path);
    insert_product(&conn, 1, "Ocupado", Some("TAKEN"), None, 1);

    let api = create_api(&db_path);
    // Row 1 collides on SKU; row 2 would be fine but must never run.
    let csv = "nome,quantidade_estoque,sku\nColide,1,TAKEN\nLivre,1,LIVRE\n";
    let import = api
        .create_import(
            1,
            1,
            SourceKind::Csv,
            ProductImportOptions::default(),
            csv.as_bytes(),
        )
        .await
        .unwrap();

    let result = api.process_import(1, import.id, 1).await;
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::AbortedByRowFailure))
    ));

    // Early exit: only the failing row was attempted.
    let reloaded = api.get_import(1, import.id).unwrap();
    assert_eq!(reloaded.status, ImportStatus::Failed);
    assert_eq!(reloaded.processed_rows, 1);
    assert_eq!(reloaded.failed_rows, 1);
    assert_eq!(reloaded.successful_rows, 0);
    assert_eq!(count_products(&conn, 1), 1); // only the pre-existing one
}

#[tokio::test]
async fn test_update_mode_missing_target_fails_row() {
    // Scenario: update_only row pointing at a product id that does
    // not exist -> "not found" failure, no mutation.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let options = ProductImportOptions {
        import_mode: ImportMode::UpdateOnly,
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let csv = "id,nome,quantidade_estoque\n999,Fantasma,5\n";
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Failed);
    assert_eq!(summary.failed_rows, 1);
    assert!(summary.errors[0].errors[0].contains("Produto com ID 999 não encontrado"));

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 0);
}

#[tokio::test]
async fn test_update_mode_updates_fields_and_emits_stock_adjustment() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_conn(&db_path);
    let product_id = insert_product(&conn, 1, "Camisa Velha", Some("SKU1"), None, 2);

    let api = create_api(&db_path);
    let options = ProductImportOptions {
        import_mode: ImportMode::UpdateOnly,
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let csv = format!(
        "id,nome,quantidade_estoque,sku,preco_venda\n{},Camisa Renovada,6,SKU1,\"39,90\"\n",
        product_id
    );
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(summary.successful_rows, 1);

    let (name, stock, price): (String, i64, Option<f64>) = conn
        .query_row(
            "SELECT name, stock_quantity, base_price FROM products WHERE id = ?1",
            [product_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Camisa Renovada");
    assert_eq!(stock, 6);
    assert_eq!(price, Some(39.90));

    // Stock went 2 -> 6: one adjustment_in of +4, no "initial".
    let (kind, change): (String, i64) = conn
        .query_row(
            "SELECT movement_type, quantity_change FROM stock_movements WHERE product_id = ?1",
            [product_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "adjustment_in");
    assert_eq!(change, 4);
}

#[tokio::test]
async fn test_update_mode_skips_duplicate_preflight() {
    // Two update rows targeting different products may share the same
    // name; the composite-key pre-flight only applies to create mode.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_conn(&db_path);
    let a = insert_product(&conn, 1, "Produto A", None, None, 1);
    let b = insert_product(&conn, 1, "Produto B", None, None, 1);

    let api = create_api(&db_path);
    let options = ProductImportOptions {
        import_mode: ImportMode::UpdateOnly,
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    // Same name but different sizes, so they stay distinct products.
    let csv = format!(
        "id,nome,quantidade_estoque,tamanho\n{},Renomeado,1,M\n{},Renomeado,1,G\n",
        a, b
    );
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(summary.successful_rows, 2);
}

#[tokio::test]
async fn test_processing_is_tenant_scoped() {
    // The same SKU may exist in another account.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_conn(&db_path);
    test_helpers::seed_account(&conn, 2, "Outra Loja").unwrap();
    insert_product(&conn, 2, "Alheio", Some("SKU-X"), None, 1);

    let api = create_api(&db_path);
    let csv = "nome,quantidade_estoque,sku\nMeu Produto,1,SKU-X\n";
    let import = api
        .create_import(
            1,
            1,
            SourceKind::Csv,
            ProductImportOptions::default(),
            csv.as_bytes(),
        )
        .await
        .unwrap();

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.status, ImportStatus::Completed);
    assert_eq!(count_products(&conn, 1), 1);
}
