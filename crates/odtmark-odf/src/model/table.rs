//! Table records

use super::document::Block;
use super::{parse_number, Element, Fields};

/// `table:table`
///
/// Header rows and row groups are flattened into `rows` in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: Option<String>,
    pub style_name: Option<String>,
    pub rows: Vec<TableRow>,
}

impl Fields for Table {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "style_name" => self.style_name = Some(value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        match (field, child) {
            ("rows", Element::TableRow(row)) => self.rows.push(row),
            ("rows", Element::TableRowGroup(group)) => self.rows.extend(group.rows),
            _ => {}
        }
    }
}

/// `table:table-header-rows` or `table:table-rows`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRowGroup {
    pub rows: Vec<TableRow>,
}

impl Fields for TableRowGroup {
    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("rows", Element::TableRow(row)) = (field, child) {
            self.rows.push(row);
        }
    }
}

/// `table:table-row`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl Fields for TableRow {
    fn attach_child(&mut self, field: &str, child: Element) {
        if let ("cells", Element::TableCell(cell)) = (field, child) {
            self.cells.push(cell);
        }
    }
}

/// `table:table-cell`; covered cells are not mapped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub column_span: Option<u32>,
    pub row_span: Option<u32>,
    pub blocks: Vec<Block>,
}

impl Fields for TableCell {
    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "column_span" => self.column_span = parse_number(&value),
            "row_span" => self.row_span = parse_number(&value),
            _ => {}
        }
    }

    fn attach_child(&mut self, field: &str, child: Element) {
        if field == "blocks" {
            if let Some(block) = Block::from_element(child) {
                self.blocks.push(block);
            }
        }
    }
}
