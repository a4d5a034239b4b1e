//! Extraction by walking the table markup directly instead of its rendered
//! lines. Anchors on the capacity cells (`td#rightSide`) and climbs to the
//! nearest preceding `span.dataheader` row for the unit name, so one header
//! shared by several capacity rows yields repeated records; callers dedupe.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};

use crate::assemble::RecordAssembler;
use crate::classify::{CapacityFigures, Classifier, LineClass};
use crate::normalize::{clean_line, integer_tokens, strip_label};
use crate::record::UnitRecord;

const CAPACITY_CELL: &str = "td#rightSide";
const UNIT_HEADER: &str = "span.dataheader";
const MIN_CAPACITY_CELLS: usize = 4;

struct Selectors {
    capacity_cell: Selector,
    unit_header: Selector,
    cell: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            capacity_cell: selector(CAPACITY_CELL)?,
            unit_header: selector(UNIT_HEADER)?,
            cell: selector("td")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|error| anyhow!("invalid selector {css}: {error}"))
}

pub fn extract_units(html: &str, classifier: &Classifier) -> Result<Vec<UnitRecord>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);
    let mut assembler = RecordAssembler::new();

    for cell in document.select(&selectors.capacity_cell) {
        if !is_capacity_label(cell, classifier) {
            continue;
        }
        let Some(row) = enclosing_row(cell) else {
            continue;
        };
        let Some(figures) = capacity_figures(row, &selectors) else {
            continue;
        };
        let Some((name, before)) = unit_header(row, &selectors, classifier) else {
            continue;
        };

        assembler.open_unit(&name);
        assembler.apply(LineClass::Capacity(figures));
        for sibling in before.into_iter().chain(rows_after(row, &selectors, classifier)) {
            match classifier.classify(&row_text(sibling)) {
                class @ (LineClass::Updated(_) | LineClass::Message(_)) => assembler.apply(class),
                _ => {}
            }
        }
    }

    Ok(assembler.finish())
}

fn is_capacity_label(cell: ElementRef<'_>, classifier: &Classifier) -> bool {
    let text = clean_line(&cell.text().collect::<String>());
    strip_label(&text, &classifier.labels().capacity) == Some("")
}

fn is_capacity_row(row: ElementRef<'_>, selectors: &Selectors, classifier: &Classifier) -> bool {
    row.select(&selectors.capacity_cell)
        .any(|cell| is_capacity_label(cell, classifier))
}

fn enclosing_row(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.ancestors().filter_map(ElementRef::wrap).find(is_row)
}

/// Cells are pool, free beds, waiting referrals after the label cell; text
/// that is not an integer counts as zero.
fn capacity_figures(row: ElementRef<'_>, selectors: &Selectors) -> Option<CapacityFigures> {
    let mut cells = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "td")
        .collect::<Vec<_>>();
    if cells.len() < MIN_CAPACITY_CELLS {
        cells = row.select(&selectors.cell).collect();
    }
    if cells.len() < MIN_CAPACITY_CELLS {
        return None;
    }
    let figure = |index: usize| integer_tokens(&row_text(cells[index])).first().copied();
    Some(CapacityFigures {
        pool: figure(1),
        free_beds: figure(2).unwrap_or(0),
        waiting_referrals: figure(3).unwrap_or(0),
    })
}

/// Walks back to the nearest row holding a unit header. Returns the unit
/// name and the rows strictly between header and capacity row, in document
/// order; collection stops at another unit's capacity row.
fn unit_header<'a>(
    row: ElementRef<'a>,
    selectors: &Selectors,
    classifier: &Classifier,
) -> Option<(String, Vec<ElementRef<'a>>)> {
    let mut between = Vec::new();
    let mut collecting = true;
    for sibling in row.prev_siblings().filter_map(ElementRef::wrap).filter(is_row) {
        if let Some(header) = sibling.select(&selectors.unit_header).next() {
            let name = clean_line(&header.text().collect::<String>());
            if name.is_empty() {
                return None;
            }
            between.reverse();
            return Some((name, between));
        }
        if is_capacity_row(sibling, selectors, classifier) {
            collecting = false;
        }
        if collecting {
            between.push(sibling);
        }
    }
    None
}

/// Rows following the capacity row up to the next unit header or capacity row.
fn rows_after<'a>(
    row: ElementRef<'a>,
    selectors: &'a Selectors,
    classifier: &'a Classifier,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    row.next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(is_row)
        .take_while(move |sibling| {
            sibling.select(&selectors.unit_header).next().is_none()
                && !is_capacity_row(*sibling, selectors, classifier)
        })
}

fn is_row(element: &ElementRef<'_>) -> bool {
    element.value().name() == "tr"
}

fn row_text(element: ElementRef<'_>) -> String {
    clean_line(&element.text().collect::<Vec<_>>().join(" "))
}
