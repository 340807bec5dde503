use rust_xlsxwriter::Workbook;
use sea_orm::{QueryFilter, prelude::*};

use crate::{
    ResultEngine, expenses,
    normalize::Category,
    template::{SheetColumn, add_sheet},
};

use super::{Engine, expenses::in_activity_order};

const EXPORT_SHEET: &str = "花销";

const EXPORT_COLUMNS: &[SheetColumn] = &[
    ("日期", 14.0),
    ("时间段", 16.0),
    ("耗时(分钟)", 12.0),
    ("耗时显示", 12.0),
    ("项目描述", 28.0),
    ("金额", 12.0),
    ("优惠金额", 12.0),
    ("优惠说明", 16.0),
    ("货币", 10.0),
    ("车次/航班号", 14.0),
    ("支付渠道", 14.0),
    ("分类", 10.0),
    ("备注", 24.0),
];

/// An `.xlsx` file ready for download.
#[derive(Clone, Debug)]
pub struct ExportedWorkbook {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn category_label(stored: &str) -> String {
    let trimmed = stored.trim();
    if trimmed.is_empty() {
        return Category::Other.label().to_string();
    }
    Category::from_code(&trimmed.to_uppercase())
        .map_or_else(|| trimmed.to_string(), |category| category.label().to_string())
}

impl Engine {
    /// Every expense of a book in activity order, with category and pay
    /// channel codes written as the labels the owner sees.
    pub async fn export_book(&self, book_id: i64, user_id: &str) -> ResultEngine<ExportedWorkbook> {
        let book = self.require_book(&self.database, book_id, user_id).await?;
        let registry = self.registry_in(&self.database, user_id).await?;
        let rows = in_activity_order(
            expenses::Entity::find().filter(expenses::Column::BookId.eq(book.id)),
        )
        .all(&self.database)
        .await?;

        let mut workbook = Workbook::new();
        let sheet = add_sheet(&mut workbook, EXPORT_SHEET, EXPORT_COLUMNS)?;
        for (row, expense) in (1u32..).zip(&rows) {
            sheet.write_string(row, 0, &expense.date)?;
            sheet.write_string(row, 1, expense.time_range.as_deref().unwrap_or_default())?;
            if let Some(minutes) = expense.duration_minutes {
                sheet.write_number(row, 2, minutes)?;
            }
            sheet.write_string(row, 3, expense.duration_display.as_deref().unwrap_or_default())?;
            sheet.write_string(row, 4, &expense.title)?;
            sheet.write_number(row, 5, expense.amount)?;
            sheet.write_number(row, 6, expense.discount_amount)?;
            sheet.write_string(row, 7, expense.discount_note.as_deref().unwrap_or_default())?;
            sheet.write_string(row, 8, &expense.currency)?;
            sheet.write_string(row, 9, expense.vehicle_no.as_deref().unwrap_or_default())?;
            sheet.write_string(row, 10, registry.label_for(expense.pay_channel.as_deref()))?;
            sheet.write_string(row, 11, category_label(&expense.category))?;
            sheet.write_string(row, 12, expense.remark.as_deref().unwrap_or_default())?;
        }

        Ok(ExportedWorkbook {
            file_name: format!("{}-export.xlsx", book.name),
            bytes: workbook.save_to_buffer()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_become_labels() {
        assert_eq!(category_label("FOOD"), "餐饮");
        assert_eq!(category_label(" transport "), "交通");
        assert_eq!(category_label("SNACKS"), "SNACKS");
        assert_eq!(category_label(""), "其他");
    }
}
