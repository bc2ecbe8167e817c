use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use rust_xlsxwriter::{Format, Image, Workbook, Worksheet, XlsxError};
use tracing::{instrument, warn};

use crate::entities::{activity_log, inventory_item};
use crate::errors::ServiceError;
use crate::services::inventory::InventoryService;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read-side projections of the two tables into offline formats. Never writes;
/// a failure here cannot corrupt the store.
#[derive(Clone)]
pub struct ExportService {
    inventory: InventoryService,
    logo_path: Option<String>,
}

impl ExportService {
    pub fn new(inventory: InventoryService, logo_path: Option<String>) -> Self {
        Self {
            inventory,
            logo_path,
        }
    }

    /// Spreadsheet with one sheet per table, newest rows first.
    #[instrument(skip(self))]
    pub async fn workbook(&self) -> Result<Vec<u8>, ServiceError> {
        let items = self.inventory.snapshot().await?;
        let entries = self.inventory.activity().await?;
        build_workbook(&items, &entries, self.logo_path.as_deref())
            .map_err(|err| ServiceError::ExportFailed(err.to_string()))
    }

    /// Paginated plain-text PDF of both tables.
    #[instrument(skip(self))]
    pub async fn pdf(&self) -> Result<Vec<u8>, ServiceError> {
        let items = self.inventory.snapshot().await?;
        let entries = self.inventory.activity().await?;
        build_pdf(&items, &entries).map_err(|err| ServiceError::ExportFailed(err.to_string()))
    }
}

fn build_workbook(
    items: &[inventory_item::Model],
    entries: &[activity_log::Model],
    logo_path: Option<&str>,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet().set_name("Inventory")?;
        let mut row = insert_logo(sheet, logo_path)?;
        sheet.write_string_with_format(row, 0, "Barcode", &header)?;
        sheet.write_string_with_format(row, 1, "Name", &header)?;
        sheet.write_string_with_format(row, 2, "Quantity", &header)?;
        sheet.write_string_with_format(row, 3, "Updated", &header)?;
        for item in items {
            row += 1;
            sheet.write_string(row, 0, &item.barcode)?;
            sheet.write_string(row, 1, item.name.as_deref().unwrap_or(""))?;
            sheet.write_number(row, 2, item.quantity as f64)?;
            sheet.write_string(row, 3, item.updated_at.format(TIME_FORMAT).to_string())?;
        }
    }

    {
        let sheet = workbook.add_worksheet().set_name("Activity Log")?;
        sheet.write_string_with_format(0, 0, "Barcode", &header)?;
        sheet.write_string_with_format(0, 1, "Action", &header)?;
        sheet.write_string_with_format(0, 2, "Quantity", &header)?;
        sheet.write_string_with_format(0, 3, "Time", &header)?;
        for (offset, entry) in entries.iter().enumerate() {
            let row = offset as u32 + 1;
            sheet.write_string(row, 0, &entry.barcode)?;
            sheet.write_string(row, 1, entry.action.as_str())?;
            sheet.write_number(row, 2, entry.quantity as f64)?;
            sheet.write_string(row, 3, entry.created_at.format(TIME_FORMAT).to_string())?;
        }
    }

    workbook.save_to_buffer()
}

/// Places the configured logo above the table if it loads; a missing or
/// unreadable asset is skipped so the export itself never fails. Returns the
/// first free row.
fn insert_logo(sheet: &mut Worksheet, logo_path: Option<&str>) -> Result<u32, XlsxError> {
    let Some(path) = logo_path else {
        return Ok(0);
    };
    match Image::new(path) {
        Ok(image) => {
            sheet.insert_image(0, 0, &image)?;
            Ok(5)
        }
        Err(err) => {
            warn!(path, error = %err, "export logo not loadable, continuing without it");
            Ok(0)
        }
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 6.0;

struct PdfWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    y: f32,
}

impl PdfWriter<'_> {
    fn line(&mut self, text: &str, size: f32) {
        if self.y < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), self.font);
        self.y -= LINE_HEIGHT;
    }
}

fn build_pdf(
    items: &[inventory_item::Model],
    entries: &[activity_log::Model],
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(
        "Stockroom export",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "content",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = PdfWriter {
        doc: &doc,
        layer,
        font: &font,
        y: PAGE_HEIGHT - MARGIN,
    };

    writer.layer.use_text(
        "Inventory",
        14.0,
        Mm(MARGIN),
        Mm(writer.y),
        &bold,
    );
    writer.y -= LINE_HEIGHT * 1.5;
    writer.line("Barcode | Name | Quantity | Updated", 10.0);
    for item in items {
        writer.line(
            &format!(
                "{} | {} | {} | {}",
                item.barcode,
                item.name.as_deref().unwrap_or(""),
                item.quantity,
                item.updated_at.format(TIME_FORMAT)
            ),
            10.0,
        );
    }

    writer.y -= LINE_HEIGHT;
    writer.line("Activity Log", 14.0);
    writer.line("Barcode | Action | Quantity | Time", 10.0);
    for entry in entries {
        writer.line(
            &format!(
                "{} | {} | {} | {}",
                entry.barcode,
                entry.action.as_str(),
                entry.quantity,
                entry.created_at.format(TIME_FORMAT)
            ),
            10.0,
        );
    }

    doc.save_to_bytes()
}
