// ==========================================
// Vendi Backoffice - NF-e XML source parser
// ==========================================
// One row per <det> product element of a Brazilian NF-e invoice.
// Namespace-agnostic (matches by local tag name). Rows sharing a
// supplier code are merged with their quantities summed.
// ==========================================

use crate::domain::product_import::{RawRow, RowError};
use crate::importer::error::ImportResult;
use crate::importer::traits::{ParsedFile, SourceParser};
use roxmltree::{Document, Node};
use std::collections::HashMap;

pub struct XmlParser;

impl SourceParser for XmlParser {
    fn parse(&self, bytes: &[u8]) -> ImportResult<ParsedFile> {
        let content = String::from_utf8_lossy(bytes);
        // Malformed XML aborts the whole parse.
        let doc = Document::parse(&content)?;

        let det_elements: Vec<Node> = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "det")
            .collect();

        if det_elements.is_empty() {
            return Ok(ParsedFile {
                rows: Vec::new(),
                errors: vec![RowError::top_level(
                    "Nenhum item de produto encontrado no XML (elementos det).".to_string(),
                )],
                total_rows: 0,
            });
        }

        let mut valid_rows = Vec::new();
        let mut errors = Vec::new();
        let mut row_number = 0usize;

        for det in &det_elements {
            row_number += 1;
            let row = extract_row(det);
            let validation_errors = validate_row(&row);

            if validation_errors.is_empty() {
                valid_rows.push(row);
            } else {
                errors.push(RowError::new(row_number, Some(row), validation_errors));
            }
        }

        Ok(ParsedFile {
            rows: merge_by_supplier_code(valid_rows),
            errors,
            total_rows: row_number as i64,
        })
    }
}

/// Map one <det> element to a typed row.
///
/// Field sources: xProd -> name, qCom (truncated) -> quantity,
/// vUnCom falling back to vUnTrib -> cost, cProd falling back to
/// cBarra -> code (used as both sku and supplier code),
/// NCM + uCom -> free-text description.
fn extract_row(det: &Node) -> RawRow {
    let Some(prod) = child_element(det, "prod") else {
        return RawRow {
            stock_quantity: Some(0),
            ..RawRow::default()
        };
    };

    let name = text_at(&prod, "xProd");
    let quantity = decimal_at(&prod, "qCom")
        .map(|v| v.trunc() as i64)
        .unwrap_or(0);
    let cost = decimal_at(&prod, "vUnCom").or_else(|| decimal_at(&prod, "vUnTrib"));

    let code = text_at(&prod, "cProd").or_else(|| text_at(&prod, "cBarra"));

    let mut description_parts = Vec::new();
    if let Some(ncm) = text_at(&prod, "NCM") {
        description_parts.push(format!("NCM: {}", ncm));
    }
    if let Some(unit) = text_at(&prod, "uCom") {
        description_parts.push(format!("Un: {}", unit));
    }
    let description = if description_parts.is_empty() {
        None
    } else {
        Some(description_parts.join(" | "))
    };

    RawRow {
        name,
        stock_quantity: Some(quantity),
        cost_price: cost,
        sku: code.clone(),
        supplier_code: code,
        description,
        ..RawRow::default()
    }
}

fn validate_row(row: &RawRow) -> Vec<String> {
    let mut errors = Vec::new();

    if row.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push("Nome é obrigatório".to_string());
    }

    match row.stock_quantity {
        None => errors.push("Quantidade de estoque é obrigatória".to_string()),
        Some(q) if q < 0 => {
            errors.push("Quantidade de estoque deve ser maior ou igual a zero".to_string())
        }
        Some(_) => {}
    }

    if matches!(row.cost_price, Some(v) if v < 0.0) {
        errors.push("Preço de custo deve ser maior ou igual a zero".to_string());
    }

    errors
}

/// Merge rows sharing a non-blank supplier code: quantities are
/// summed, every other field comes from the first occurrence. Rows
/// without a supplier code are never merged and keep their relative
/// order after the merged ones.
fn merge_by_supplier_code(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut merged: Vec<RawRow> = Vec::new();
    let mut index_by_code: HashMap<String, usize> = HashMap::new();
    let mut without_code: Vec<RawRow> = Vec::new();

    for row in rows {
        let code = row
            .supplier_code
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        if code.is_empty() {
            without_code.push(row);
            continue;
        }

        match index_by_code.get(&code) {
            Some(&idx) => {
                let quantity = row.stock_quantity.unwrap_or(0);
                let entry = &mut merged[idx];
                entry.stock_quantity = Some(entry.stock_quantity.unwrap_or(0) + quantity);
            }
            None => {
                index_by_code.insert(code, merged.len());
                merged.push(row);
            }
        }
    }

    merged.extend(without_code);
    merged
}

fn child_element<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text_at(node: &Node, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn decimal_at(node: &Node, name: &str) -> Option<f64> {
    text_at(node, name)?.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;

    fn nfe(dets: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe">
  <NFe><infNFe>{dets}</infNFe></NFe>
</nfeProc>"#
        )
    }

    fn det(code: &str, name: &str, qty: &str, price: &str) -> String {
        format!(
            "<det nItem=\"1\"><prod><cProd>{code}</cProd><xProd>{name}</xProd>\
             <NCM>61091000</NCM><uCom>UN</uCom><qCom>{qty}</qCom><vUnCom>{price}</vUnCom>\
             </prod></det>"
        )
    }

    #[test]
    fn test_parse_single_det() {
        let xml = nfe(&det("ABC", "Camiseta Básica", "5.0000", "12.50"));
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();

        assert_eq!(parsed.total_rows, 1);
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.name.as_deref(), Some("Camiseta Básica"));
        assert_eq!(row.stock_quantity, Some(5));
        assert_eq!(row.cost_price, Some(12.50));
        assert_eq!(row.sku.as_deref(), Some("ABC"));
        assert_eq!(row.supplier_code.as_deref(), Some("ABC"));
        assert_eq!(row.description.as_deref(), Some("NCM: 61091000 | Un: UN"));
    }

    #[test]
    fn test_merge_same_supplier_code() {
        // Two det elements with code "ABC", quantities 3 and 4 -> one
        // merged row with quantity 7.
        let xml = nfe(&format!(
            "{}{}",
            det("ABC", "Camiseta", "3", "10.00"),
            det("ABC", "Camiseta", "4", "10.00")
        ));
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();

        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].stock_quantity, Some(7));
    }

    #[test]
    fn test_rows_without_code_are_not_merged() {
        let xml = nfe(
            "<det><prod><xProd>Avulso A</xProd><qCom>1</qCom><vUnCom>5.00</vUnCom></prod></det>\
             <det><prod><xProd>Avulso B</xProd><qCom>1</qCom><vUnCom>5.00</vUnCom></prod></det>",
        );
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_vuntrib_fallback() {
        let xml = nfe(
            "<det><prod><cProd>X</cProd><xProd>Meia</xProd><qCom>2</qCom>\
             <vUnTrib>3.75</vUnTrib></prod></det>",
        );
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].cost_price, Some(3.75));
    }

    #[test]
    fn test_cbarra_fallback() {
        let xml = nfe(
            "<det><prod><cBarra>789</cBarra><xProd>Meia</xProd><qCom>2</qCom>\
             <vUnCom>3.75</vUnCom></prod></det>",
        );
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].supplier_code.as_deref(), Some("789"));
    }

    #[test]
    fn test_quantity_is_truncated() {
        let xml = nfe(&det("A", "Meia", "2.9000", "1.00"));
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].stock_quantity, Some(2));
    }

    #[test]
    fn test_zero_det_elements() {
        let xml = nfe("");
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();

        assert_eq!(parsed.total_rows, 0);
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 0);
        assert!(parsed.errors[0].errors[0].contains("Nenhum item de produto"));
    }

    #[test]
    fn test_missing_name_is_row_error() {
        let xml = nfe("<det><prod><cProd>A</cProd><qCom>1</qCom></prod></det>");
        let parsed = XmlParser.parse(xml.as_bytes()).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0]
            .errors
            .contains(&"Nome é obrigatório".to_string()));
    }

    #[test]
    fn test_malformed_xml_aborts() {
        let result = XmlParser.parse(b"<nfe><unclosed>");
        assert!(matches!(result, Err(ImportError::XmlSyntax(_))));
    }
}
