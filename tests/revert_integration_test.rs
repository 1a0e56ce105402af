// ==========================================
// Revert service integration tests
// ==========================================
// Revert deletes the products one completed import created, pulling
// them out of draft sales; confirmed sales block the revert.
// ==========================================

mod test_helpers;

use test_helpers::{
    count_products, create_api, create_test_db, insert_sale_with_item, open_conn,
};
use vendi_backoffice::api::{ApiError, ImportApi};
use vendi_backoffice::domain::product_import::ProductImportOptions;
use vendi_backoffice::domain::types::{ImportStatus, SourceKind};
use vendi_backoffice::importer::ImportError;
use vendi_backoffice::logging;

async fn completed_import(api: &ImportApi) -> i64 {
    let csv = "nome,quantidade_estoque,preco_venda\nCamisa,5,\"19,90\"\nBermuda,2,\"29,90\"\n";
    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Csv, options, csv.as_bytes())
        .await
        .unwrap();
    api.process_import(1, import.id, 1).await.unwrap();
    import.id
}

#[tokio::test]
async fn test_revert_deletes_imported_products() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);
    let import_id = completed_import(&api).await;

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 2);

    let reverted = api.revert_import(1, import_id).await.unwrap();
    assert_eq!(reverted.status, ImportStatus::Reverted);
    assert_eq!(count_products(&conn, 1), 0);
}

#[tokio::test]
async fn test_revert_requires_completed_status() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let csv = "nome,quantidade_estoque\nCamisa,5\n";
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

    let result = api.revert_import(1, import.id).await;
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::RevertNotCompleted))
    ));
}

#[tokio::test]
async fn test_revert_blocked_by_confirmed_sale() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);
    let import_id = completed_import(&api).await;

    let conn = open_conn(&db_path);
    let products = api.imported_products(1, import_id).unwrap();
    insert_sale_with_item(&conn, 1, products[0].id, "completed", 1, 19.90);

    let result = api.revert_import(1, import_id).await;
    assert!(matches!(
        result,
        Err(ApiError::Import(ImportError::RevertBlockedBySales { count: 1 }))
    ));

    // Nothing was deleted.
    assert_eq!(count_products(&conn, 1), 2);
    assert_eq!(
        api.get_import(1, import_id).unwrap().status,
        ImportStatus::Completed
    );
}

#[tokio::test]
async fn test_revert_removes_products_from_draft_sales_and_recomputes_totals() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);
    let import_id = completed_import(&api).await;

    let conn = open_conn(&db_path);
    let products = api.imported_products(1, import_id).unwrap();
    // Draft sale holding one imported product plus one foreign item.
    let sale_id = insert_sale_with_item(&conn, 1, products[0].id, "draft", 2, 19.90);
    let other_id = test_helpers::insert_product(&conn, 1, "Avulso", None, None, 1);
    conn.execute(
        "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, total_price)
         VALUES (?1, ?2, 1, 10.0, 10.0)",
        rusqlite::params![sale_id, other_id],
    )
    .unwrap();
    conn.execute(
        "UPDATE sales SET total_amount = 49.80 WHERE id = ?1",
        rusqlite::params![sale_id],
    )
    .unwrap();

    api.revert_import(1, import_id).await.unwrap();

    // The imported product left the draft sale; the foreign item and
    // its value remain.
    let (items, total): (i64, f64) = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM sale_items WHERE sale_id = ?1),
                    (SELECT total_amount FROM sales WHERE id = ?1)",
            rusqlite::params![sale_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(items, 1);
    assert_eq!(total, 10.0);
}

#[tokio::test]
async fn test_completed_import_cannot_be_deleted_but_ready_can() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);
    let completed_id = completed_import(&api).await;

    let result = api.delete_import(1, completed_id);
    assert!(matches!(result, Err(ApiError::DeleteCompletedImport)));

    let csv = "nome,quantidade_estoque\nCamisa,5\n";
    let ready = api
        .create_import(
            1,
            1,
            SourceKind::Csv,
            ProductImportOptions::default(),
            csv.as_bytes(),
        )
        .await
        .unwrap();
    api.delete_import(1, ready.id).unwrap();
    assert!(matches!(
        api.get_import(1, ready.id),
        Err(ApiError::ImportNotFound(_))
    ));
}
