// ==========================================
// Vendi Backoffice - CSV source parser
// ==========================================
// Delimited text with a header row. Header keys are normalized
// (trim + lowercase); money fields go through the currency
// normalizer; booleans through a tri-state parser.
// Row validation errors accumulate; malformed CSV aborts the parse.
// ==========================================

use crate::domain::product_import::{RawRow, RowError};
use crate::domain::slug::slugify;
use crate::importer::currency;
use crate::importer::error::ImportResult;
use crate::importer::traits::{ParsedFile, SourceParser};
use std::collections::HashMap;

pub struct CsvParser;

impl SourceParser for CsvParser {
    fn parse(&self, bytes: &[u8]) -> ImportResult<ParsedFile> {
        let content = String::from_utf8_lossy(bytes);

        // Strict record lengths: a ragged or badly-quoted file is a
        // file-level syntax error, not a row error.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        // Normalized header keys: trim + lowercase
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut parsed = ParsedFile::default();
        let mut row_number = 0usize;

        for result in reader.records() {
            // File-level syntax error: abort the whole parse.
            let record = result?;
            row_number += 1;

            let mut fields = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            let (row, validation_errors) = normalize_row(&fields);
            if validation_errors.is_empty() {
                parsed.rows.push(row);
            } else {
                parsed
                    .errors
                    .push(RowError::new(row_number, Some(row), validation_errors));
            }
        }

        parsed.total_rows = row_number as i64;
        Ok(parsed)
    }
}

/// Build the typed row and collect its validation errors.
fn normalize_row(fields: &HashMap<String, String>) -> (RawRow, Vec<String>) {
    let mut errors = Vec::new();

    let name = get_present(fields, "nome");
    let stock_quantity = parse_integer(get_present(fields, "quantidade_estoque").as_deref());
    let cost_price = parse_money(get_present(fields, "preco_custo").as_deref());
    // preco_venda is the current column; preco_base kept for older CSVs
    let sale_price = parse_money(
        get_present(fields, "preco_venda")
            .or_else(|| get_present(fields, "preco_base"))
            .as_deref(),
    );

    let id = match get_present(fields, "id") {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v >= 1 => Some(v),
            _ => {
                errors.push("ID do produto deve ser um número inteiro positivo".to_string());
                None
            }
        },
    };

    let row = RawRow {
        id,
        name: name.clone(),
        description: get_present(fields, "descricao"),
        sku: get_present(fields, "sku"),
        supplier_code: get_present(fields, "codigo_fornecedor"),
        category: get_present(fields, "categoria"),
        brand: get_present(fields, "marca"),
        color: get_present(fields, "cor"),
        size: get_present(fields, "tamanho"),
        cost_price,
        sale_price,
        sale_price_auto: None,
        stock_quantity,
        active: parse_boolean(get_present(fields, "ativo").as_deref()),
    };

    if name.is_none() {
        errors.push("Nome é obrigatório".to_string());
    }

    match stock_quantity {
        None => errors.push("Quantidade de estoque é obrigatória".to_string()),
        Some(q) if q < 0 => {
            errors.push("Quantidade de estoque deve ser maior ou igual a zero".to_string())
        }
        Some(_) => {}
    }

    if matches!(cost_price, Some(v) if v < 0.0) {
        errors.push("Preço de custo deve ser maior ou igual a zero".to_string());
    }
    if matches!(sale_price, Some(v) if v < 0.0) {
        errors.push("Preço de venda deve ser maior ou igual a zero".to_string());
    }

    (row, errors)
}

fn get_present(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_money(value: Option<&str>) -> Option<f64> {
    currency::parse(value?)
}

fn parse_integer(value: Option<&str>) -> Option<i64> {
    value?.trim().parse::<i64>().ok()
}

/// Tri-state boolean: {sim, true, 1} -> true, {não, false, 0} -> false,
/// anything else (including blank) -> true.
fn parse_boolean(value: Option<&str>) -> bool {
    let Some(raw) = value else {
        return true;
    };
    match slugify(raw).as_str() {
        "sim" | "true" | "1" => true,
        "nao" | "false" | "0" => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParsedFile {
        CsvParser.parse(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_basic_rows() {
        let parsed = parse(
            "nome,quantidade_estoque,preco_custo,preco_venda\n\
             Camisa,5,\"10,00\",\"19,90\"\n\
             Bermuda,3,15.50,29.90\n",
        );

        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows[0].name.as_deref(), Some("Camisa"));
        assert_eq!(parsed.rows[0].cost_price, Some(10.0));
        assert_eq!(parsed.rows[0].sale_price, Some(19.90));
        assert_eq!(parsed.rows[1].cost_price, Some(15.50));
    }

    #[test]
    fn test_headers_are_normalized() {
        let parsed = parse("  NOME , Quantidade_Estoque \nCamisa,4\n");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].stock_quantity, Some(4));
    }

    #[test]
    fn test_missing_name_is_row_error() {
        let parsed = parse("nome,quantidade_estoque\n,5\nCamisa,3\n");
        assert_eq!(parsed.total_rows, 2);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 1);
        assert!(parsed.errors[0]
            .errors
            .contains(&"Nome é obrigatório".to_string()));
    }

    #[test]
    fn test_missing_and_negative_stock() {
        let parsed = parse("nome,quantidade_estoque\nCamisa,\nBermuda,-2\n");
        assert_eq!(parsed.rows.len(), 0);
        assert_eq!(parsed.errors.len(), 2);
        assert!(parsed.errors[0]
            .errors
            .contains(&"Quantidade de estoque é obrigatória".to_string()));
        assert!(parsed.errors[1]
            .errors
            .contains(&"Quantidade de estoque deve ser maior ou igual a zero".to_string()));
    }

    #[test]
    fn test_negative_price_is_row_error() {
        let parsed = parse("nome,quantidade_estoque,preco_custo\nCamisa,5,\"-10,00\"\n");
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0]
            .errors
            .contains(&"Preço de custo deve ser maior ou igual a zero".to_string()));
    }

    #[test]
    fn test_invalid_id_is_row_error() {
        let parsed = parse("nome,quantidade_estoque,id\nCamisa,5,abc\nBermuda,2,0\nTênis,1,7\n");
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].id, Some(7));
        for error in &parsed.errors {
            assert!(error
                .errors
                .contains(&"ID do produto deve ser um número inteiro positivo".to_string()));
        }
    }

    #[test]
    fn test_boolean_tri_state() {
        let parsed = parse(
            "nome,quantidade_estoque,ativo\n\
             A,1,sim\nB,1,Não\nC,1,0\nD,1,1\nE,1,\nF,1,qualquer\n",
        );
        let actives: Vec<bool> = parsed.rows.iter().map(|r| r.active).collect();
        assert_eq!(actives, vec![true, false, false, true, true, true]);
    }

    #[test]
    fn test_preco_base_fallback() {
        let parsed = parse("nome,quantidade_estoque,preco_base\nCamisa,5,\"25,00\"\n");
        assert_eq!(parsed.rows[0].sale_price, Some(25.0));
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let content = "nome,quantidade_estoque\nCamisa,5\n,3\n";
        let a = parse(content);
        let b = parse(content);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.errors, b.errors);
        assert_eq!(a.total_rows, b.total_rows);
    }
}
