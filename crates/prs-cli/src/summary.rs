use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use prs_map::TemplateMetadata;
use prs_model::{ColumnMapping, MappingOrigin, OutcomeRecord, OutcomeState, SchemaContract};

use prs_cli::types::BatchResult;

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn state_cell(state: OutcomeState) -> Cell {
    match state {
        OutcomeState::Archived => Cell::new("ARCHIVED")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        OutcomeState::Quarantined => Cell::new("QUARANTINED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Print the outcome of a single pipeline run.
pub fn print_outcome(record: &OutcomeRecord) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("State"),
        header_cell("Rows"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new(&record.source_file),
        state_cell(record.state),
        Cell::new(record.rows_written),
        match &record.output_path {
            Some(path) => Cell::new(path.display()),
            None => dim_cell("-"),
        },
    ]);
    println!("{table}");
    print_failures(std::slice::from_ref(record));
}

/// Print a batch summary with per-file rows and totals.
pub fn print_batch_summary(result: &BatchResult) {
    println!("Output: {}", result.output_dir.display());
    println!("Quarantine: {}", result.quarantine_dir.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("State"),
        header_cell("Rows"),
        header_cell("Violations"),
        header_cell("Dropped columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    let mut total_rows = 0usize;
    for record in &result.outcomes {
        total_rows += record.rows_written;
        let violations = record.violations.len();
        table.add_row(vec![
            Cell::new(&record.source_file),
            state_cell(record.state),
            Cell::new(record.rows_written),
            if violations > 0 {
                Cell::new(violations).fg(Color::Red)
            } else {
                dim_cell(0)
            },
            if record.dropped_columns.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(record.dropped_columns.join(", "))
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} archived / {} quarantined",
            result.archived_count(),
            result.quarantined_count()
        )),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_failures(&result.outcomes);
}

fn print_failures(outcomes: &[OutcomeRecord]) {
    let mut rows = Vec::new();
    for record in outcomes {
        if let Some(reason) = &record.failure_reason {
            rows.push((record.source_file.clone(), "fatal".to_string(), reason.clone()));
        }
        for violation in &record.violations {
            let location = match violation.row {
                Some(row) => format!("{} (row {row})", violation.field),
                None => violation.field.clone(),
            };
            rows.push((
                record.source_file.clone(),
                violation.kind.to_string(),
                format!("{location}: {}", violation.message),
            ));
        }
    }
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Kind"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    for (file, kind, detail) in rows {
        table.add_row(vec![
            Cell::new(file),
            Cell::new(kind).fg(Color::Red),
            Cell::new(detail),
        ]);
    }
    println!();
    println!("Problems:");
    println!("{table}");
}

fn origin_cell(origin: MappingOrigin) -> Cell {
    match origin {
        MappingOrigin::SynonymExact => Cell::new("synonym").fg(Color::Green),
        MappingOrigin::Similarity => Cell::new("similarity").fg(Color::Yellow),
        MappingOrigin::UserOverride => Cell::new("override").fg(Color::Blue),
    }
}

/// Print a suggested mapping for review.
pub fn print_mapping(mapping: &ColumnMapping) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Target"),
        header_cell("Origin"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in &mapping.entries {
        match &entry.target_field {
            Some(target) => table.add_row(vec![
                Cell::new(&entry.source_header),
                Cell::new(target),
                origin_cell(entry.origin),
                Cell::new(format!("{:.2}", entry.confidence)),
            ]),
            None => table.add_row(vec![
                Cell::new(&entry.source_header),
                dim_cell("unmapped"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    println!("{table}");
    if !mapping.collisions.is_empty() {
        println!(
            "Needs manual resolution (collisions): {}",
            mapping.collisions.join(", ")
        );
    }
}

/// Print the canonical schema contract.
pub fn print_contract(contract: &SchemaContract) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Synonyms"),
    ]);
    apply_table_style(&mut table);
    for field in &contract.fields {
        table.add_row(vec![
            Cell::new(&field.name).add_attribute(Attribute::Bold),
            Cell::new(field.field_type.as_str()),
            if field.required {
                Cell::new("yes").fg(Color::Red)
            } else {
                dim_cell("no")
            },
            if field.synonyms.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(field.synonyms.join(", "))
            },
        ]);
    }
    println!("{table}");
}

/// Print stored template metadata.
pub fn print_templates(templates: &[TemplateMetadata]) {
    if templates.is_empty() {
        println!("No templates saved.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Provider"),
        header_cell("Mapped"),
        header_cell("Unmapped"),
        header_cell("Saved at"),
        header_cell("Path"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for template in templates {
        table.add_row(vec![
            Cell::new(&template.provider).add_attribute(Attribute::Bold),
            Cell::new(template.mapped_count),
            Cell::new(template.unmapped_count),
            match &template.saved_at {
                Some(saved_at) => Cell::new(saved_at),
                None => dim_cell("-"),
            },
            Cell::new(template.file_path.display()),
        ]);
    }
    println!("{table}");
}
