// ==========================================
// NF-e XML import integration tests
// ==========================================

mod test_helpers;

use test_helpers::{count_products, create_api, create_test_db, open_conn};
use vendi_backoffice::domain::product_import::ProductImportOptions;
use vendi_backoffice::domain::types::{ImportStatus, SourceKind};
use vendi_backoffice::logging;

fn nfe(dets: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe">
  <NFe><infNFe>{dets}</infNFe></NFe>
</nfeProc>"#
    )
}

#[tokio::test]
async fn test_xml_rows_with_same_supplier_code_merge() {
    // Two det elements sharing code "ABC" with quantities 3 and 4
    // must import as one product with stock 7.
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let xml = nfe(
        "<det nItem=\"1\"><prod><cProd>ABC</cProd><xProd>Camiseta</xProd>\
         <qCom>3.0000</qCom><vUnCom>12.00</vUnCom></prod></det>\
         <det nItem=\"2\"><prod><cProd>ABC</cProd><xProd>Camiseta</xProd>\
         <qCom>4.0000</qCom><vUnCom>12.00</vUnCom></prod></det>",
    );

    let options = ProductImportOptions {
        ignore_errors: true,
        ..ProductImportOptions::default()
    };
    let import = api
        .create_import(1, 1, SourceKind::Xml, options, xml.as_bytes())
        .await
        .unwrap();

    assert_eq!(import.status, ImportStatus::Ready);
    assert_eq!(import.total_rows, 2);
    assert_eq!(import.parsed_data.len(), 1);
    assert_eq!(import.parsed_data[0].stock_quantity, Some(7));

    let summary = api.process_import(1, import.id, 1).await.unwrap();
    assert_eq!(summary.successful_rows, 1);

    let products = api.imported_products(1, import.id).unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    assert_eq!(product.stock_quantity, 7);
    assert_eq!(product.sku.as_deref(), Some("ABC"));
    assert_eq!(product.supplier_code.as_deref(), Some("ABC"));
    assert_eq!(product.cost_price, Some(12.0));
}

#[tokio::test]
async fn test_xml_without_products_completes_with_informational_error() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let xml = nfe("");
    let import = api
        .create_import(
            1,
            1,
            SourceKind::Xml,
            ProductImportOptions::default(),
            xml.as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(import.status, ImportStatus::Ready);
    assert_eq!(import.total_rows, 0);
    assert!(import.parsed_data.is_empty());
    assert_eq!(import.import_errors.len(), 1);
    assert!(import.import_errors[0].errors[0].contains("Nenhum item de produto"));
}

#[tokio::test]
async fn test_malformed_xml_fails_job() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let api = create_api(&db_path);

    let import = api
        .create_import(
            1,
            1,
            SourceKind::Xml,
            ProductImportOptions::default(),
            b"<nfe><unclosed>",
        )
        .await
        .unwrap();

    assert_eq!(import.status, ImportStatus::Failed);
    assert_eq!(import.import_errors.len(), 1);
    assert_eq!(import.import_errors[0].row, 0);
    assert!(import.import_errors[0].errors[0].contains("Arquivo XML inválido"));

    let conn = open_conn(&db_path);
    assert_eq!(count_products(&conn, 1), 0);
}
