//! Schema catalog (C6): loads the schema page (page 1) once at open and
//! indexes tables and indices by name.
//!
//! Grounded on the teacher's `database.rs::Database::get_master_table`,
//! generalized per Design Note §9 to kind-tagged maps instead of the
//! teacher's single `Vec<TableInfo>` linear-scanned by closures.

use std::collections::HashMap;

use crate::byte_source::ByteSource;
use crate::error::{EngineError, Result};
use crate::page::Page;
use crate::sql::{extract_columns, extract_index_column};

#[derive(Debug, Clone)]
pub struct TableMeta {
    pub name: String,
    pub root_page: u32,
    pub sql: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IndexMeta {
    pub name: String,
    pub table_name: String,
    pub root_page: u32,
    pub column_name: String,
}

pub struct Catalog {
    tables: HashMap<String, TableMeta>,
    /// indices keyed by (table_name, column_name) for §4.6.3 lookups, plus
    /// by index name for `.index`-style introspection.
    indices_by_table_column: HashMap<(String, String), IndexMeta>,
    indices_by_name: HashMap<String, IndexMeta>,
    /// total number of schema-page cells (every table, index, view, and
    /// trigger entry), not just the tables we keep structured metadata for.
    /// `.dbinfo`'s "number of tables" line (spec.md §6, §8) counts this, not
    /// `tables.len()` — the schema page for the canonical apples/idx_apples_name
    /// fixture has 2 cells, and `.dbinfo` must report 2.
    schema_entry_count: usize,
}

impl Catalog {
    pub fn load(source: &dyn ByteSource, page_size: u16, reserved: u8) -> Result<Self> {
        let usable = page_size - reserved as u16;
        let page_bytes = source.read_at(0, page_size as usize)?;
        let schema_page = Page::decode(&page_bytes, 0, 100, usable)?;

        let mut tables = HashMap::new();
        let mut raw_indices = Vec::new();
        let schema_entry_count = schema_page.cells.len();

        for cell in &schema_page.cells {
            let record = cell
                .record()
                .ok_or_else(|| EngineError::BadPageHeader("schema cell has no record".into()))?;

            let kind = column_text(record, 0, "type")?;
            let name = column_text(record, 1, "name")?;
            let table_name = column_text(record, 2, "tbl_name")?;
            let root_page = column_int(record, 3, "rootpage")? as u32;
            let sql = column_text(record, 4, "sql")?;

            match kind.as_str() {
                "table" => {
                    let columns = extract_columns(&sql).unwrap_or_default();
                    tables.insert(
                        table_name.clone(),
                        TableMeta {
                            name: table_name,
                            root_page,
                            sql,
                            columns,
                        },
                    );
                }
                "index" => {
                    raw_indices.push((name, table_name, root_page, sql));
                }
                _ => {} // views/triggers are out of scope per §1 Non-goals
            }
        }

        let mut indices_by_table_column = HashMap::new();
        let mut indices_by_name = HashMap::new();
        for (name, table_name, root_page, sql) in raw_indices {
            let column_name = extract_index_column(&sql)
                .map(|(_, col)| col)
                .unwrap_or_default();
            let meta = IndexMeta {
                name: name.clone(),
                table_name: table_name.clone(),
                root_page,
                column_name: column_name.clone(),
            };
            indices_by_table_column.insert((table_name, column_name), meta.clone());
            indices_by_name.insert(name, meta);
        }

        Ok(Catalog {
            tables,
            indices_by_table_column,
            indices_by_name,
            schema_entry_count,
        })
    }

    pub fn table(&self, name: &str) -> Result<&TableMeta> {
        self.tables
            .get(name)
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Every schema-page entry (tables, indices, views, triggers) — what
    /// `.dbinfo`'s "number of tables" line actually reports, per the
    /// ground-truth original's `pages[0].num_cells`.
    pub fn schema_entry_count(&self) -> usize {
        self.schema_entry_count
    }

    pub fn index_on_column(&self, table_name: &str, column_name: &str) -> Option<&IndexMeta> {
        self.indices_by_table_column
            .get(&(table_name.to_string(), column_name.to_string()))
    }

    pub fn index_by_name(&self, name: &str) -> Option<&IndexMeta> {
        self.indices_by_name.get(name)
    }
}

fn column_text(record: &crate::record::Record, idx: usize, field: &str) -> Result<String> {
    match record.get(idx) {
        Some(crate::serial_type::Value::Text(s)) => Ok(s.clone()),
        _ => Err(EngineError::BadPageHeader(format!(
            "schema column '{field}' is not text"
        ))),
    }
}

fn column_int(record: &crate::record::Record, idx: usize, field: &str) -> Result<i64> {
    record
        .get(idx)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| EngineError::BadPageHeader(format!("schema column '{field}' is not an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_source::MemorySource;
    use crate::record::{encode_record, FieldValue};
    use crate::varint::encode_varint;

    /// One `apples` table and its `idx_apples_name` index, the canonical
    /// spec.md §8 fixture, packed onto a single schema leaf-table page.
    fn schema_page_bytes(page_size: u16) -> Vec<u8> {
        let table_row = encode_record(&[
            FieldValue::Text("table".to_string()),
            FieldValue::Text("apples".to_string()),
            FieldValue::Text("apples".to_string()),
            FieldValue::Int(2),
            FieldValue::Text(
                "CREATE TABLE apples (id INTEGER PRIMARY KEY, name TEXT, color TEXT)".to_string(),
            ),
        ]);
        let index_row = encode_record(&[
            FieldValue::Text("index".to_string()),
            FieldValue::Text("idx_apples_name".to_string()),
            FieldValue::Text("apples".to_string()),
            FieldValue::Int(3),
            FieldValue::Text("CREATE INDEX idx_apples_name ON apples (name)".to_string()),
        ]);

        let mut page = vec![0u8; page_size as usize];
        let h = 100; // page 1's header sits past the 100-byte file header
        page[h] = 13; // leaf table
        page[h + 3..h + 5].copy_from_slice(&2u16.to_be_bytes());

        let mut cursor = page_size as usize;
        let mut pointers = Vec::new();
        for (row_id, record) in [(1i64, &table_row), (2i64, &index_row)].into_iter().rev() {
            let mut cell = Vec::new();
            cell.extend(encode_varint(record.len() as u64));
            cell.extend(encode_varint(row_id as u64));
            cell.extend(record);
            cursor -= cell.len();
            page[cursor..cursor + cell.len()].copy_from_slice(&cell);
            pointers.push(cursor as u16);
        }
        pointers.reverse();
        page[h + 5..h + 7].copy_from_slice(&(cursor as u16).to_be_bytes());

        let mut ptr_off = h + 8;
        for p in pointers {
            page[ptr_off..ptr_off + 2].copy_from_slice(&p.to_be_bytes());
            ptr_off += 2;
        }
        page
    }

    #[test]
    fn loads_tables_and_indices_from_the_schema_page() {
        let page_size = 512u16;
        let source = MemorySource::new(schema_page_bytes(page_size));
        let catalog = Catalog::load(&source, page_size, 0).unwrap();

        assert_eq!(catalog.table_count(), 1);
        assert_eq!(catalog.table_names(), vec!["apples"]);
        assert_eq!(catalog.schema_entry_count(), 2);

        let apples = catalog.table("apples").unwrap();
        assert_eq!(apples.root_page, 2);
        assert_eq!(apples.columns, vec!["id", "name", "color"]);

        let index = catalog.index_on_column("apples", "name").unwrap();
        assert_eq!(index.name, "idx_apples_name");
        assert_eq!(index.root_page, 3);
        assert!(catalog.index_on_column("apples", "color").is_none());
        assert!(catalog.index_by_name("idx_apples_name").is_some());
    }

    #[test]
    fn unknown_table_is_an_error() {
        let page_size = 512u16;
        let source = MemorySource::new(schema_page_bytes(page_size));
        let catalog = Catalog::load(&source, page_size, 0).unwrap();
        assert!(matches!(
            catalog.table("pears"),
            Err(EngineError::UnknownTable(_))
        ));
    }
}
