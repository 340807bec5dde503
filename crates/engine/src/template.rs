//! Import template and the shared sheet-writing helpers.

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::{ResultEngine, draft::DEFAULT_CURRENCY};

pub const TEMPLATE_FILE_NAME: &str = "出行花销导入模板.xlsx";

/// Header text and column width.
pub(crate) type SheetColumn = (&'static str, f64);

const HELP_COLUMNS: &[SheetColumn] = &[("工作表", 10.0), ("字段", 22.0), ("是否必填", 10.0), ("说明", 66.0)];

const HELP_ROWS: &[[&str; 4]] = &[
    ["账本", "账本名称*", "是", "用于识别/匹配账本；若已存在同名账本，则花销会追加到该账本中"],
    ["账本", "描述", "否", "可留空；若导入时填写，则会补全/更新账本描述"],
    ["账本", "开始日期/结束日期", "否", "格式 YYYY-MM-DD；可留空；若导入时填写，则会补全/更新账本日期范围"],
    ["花销", "日期*", "是", "格式 YYYY-MM-DD"],
    ["花销", "时间段*", "是", "格式 HH:mm-HH:mm，结束时间需不早于开始时间；用于自动计算耗时(分钟)"],
    ["花销", "项目描述*", "是", "例如：午餐/景区门票/酒店住宿/网约车"],
    ["花销", "金额*", "是", "非负数字"],
    ["花销", "分类*", "是", "可填中文(交通/住宿/餐饮/门票/购物/其他)或代码(TRANSPORT/HOTEL/FOOD/TICKET/SHOPPING/OTHER)"],
    ["花销", "车次/航班号", "条件必填", "当分类为「交通/TRANSPORT」时必填"],
    ["花销", "优惠金额", "否", "可留空；若填写需为非负数字且不大于金额"],
    ["花销", "支付渠道", "否", "可留空；可填中文(支付宝/微信/银联/现金/抖音月付/美团月付/其他)或代码(ALIPAY/WECHAT/UNIONPAY/CASH/DOUYIN_MONTHLY/MEITUAN_MONTHLY/OTHER)"],
    ["导入规则", "", "", "空行会自动忽略；必填缺失或格式不合法会跳过该行并在返回结果中给出行号与原因"],
];

const BOOK_COLUMNS: &[SheetColumn] = &[
    ("账本名称*", 24.0),
    ("描述", 40.0),
    ("开始日期(YYYY-MM-DD)", 20.0),
    ("结束日期(YYYY-MM-DD)", 20.0),
];

const EXPENSE_COLUMNS: &[SheetColumn] = &[
    ("日期*(YYYY-MM-DD)", 18.0),
    ("时间段*(HH:mm-HH:mm)", 22.0),
    ("耗时(分钟)", 12.0),
    ("耗时显示", 12.0),
    ("项目描述*", 34.0),
    ("金额*", 12.0),
    ("优惠金额", 12.0),
    ("优惠说明", 18.0),
    ("货币(默认CNY)", 14.0),
    ("车次/航班号(交通必填)", 22.0),
    ("支付渠道(可填中文或代码)", 22.0),
    ("分类*(可填中文或代码)", 22.0),
    ("备注", 36.0),
];

/// Add a sheet named `name` with a bold, frozen header row.
pub(crate) fn add_sheet<'a>(
    workbook: &'a mut Workbook,
    name: &str,
    columns: &[SheetColumn],
) -> ResultEngine<&'a mut Worksheet> {
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xE8EEF7));

    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    for (column, (title, width)) in (0u16..).zip(columns) {
        sheet.write_string_with_format(0, column, *title, &header)?;
        sheet.set_column_width(column, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(sheet)
}

/// Three sheets: field documentation, one sample book row and one sample
/// expense row. The sample rows import cleanly.
pub fn import_template() -> ResultEngine<Vec<u8>> {
    let mut workbook = Workbook::new();

    let help = add_sheet(&mut workbook, "说明", HELP_COLUMNS)?;
    for (row, cells) in (1u32..).zip(HELP_ROWS) {
        for (column, text) in (0u16..).zip(cells) {
            help.write_string(row, column, *text)?;
        }
    }

    let book = add_sheet(&mut workbook, "账本", BOOK_COLUMNS)?;
    book.write_string(1, 0, "示例：2026春节出行")?;
    book.write_string(1, 1, "示例：广州-北京往返，全家出行")?;
    book.write_string(1, 2, "2026-02-10")?;
    book.write_string(1, 3, "2026-02-15")?;

    let expenses = add_sheet(&mut workbook, "花销", EXPENSE_COLUMNS)?;
    expenses.write_string(1, 0, "2026-02-10")?;
    expenses.write_string(1, 1, "09:10-10:35")?;
    expenses.write_number(1, 2, 85)?;
    expenses.write_string(1, 3, "1h25m")?;
    expenses.write_string(1, 4, "高铁票")?;
    expenses.write_number(1, 5, 560)?;
    expenses.write_number(1, 6, 20)?;
    expenses.write_string(1, 7, "平台券")?;
    expenses.write_string(1, 8, DEFAULT_CURRENCY)?;
    expenses.write_string(1, 9, "G1234")?;
    expenses.write_string(1, 10, "支付宝")?;
    expenses.write_string(1, 11, "交通")?;
    expenses.write_string(1, 12, "二等座")?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        columns::{ColumnMap, EXPENSE_HEADERS, EXPENSE_SHEET_NAMES, ExpenseColumn},
        workbook::Workbook as Reader,
    };

    #[test]
    fn template_has_three_sheets_with_known_headers() {
        let bytes = import_template().unwrap();
        let workbook = Reader::load(&bytes).unwrap();
        assert!(workbook.sheet("说明").is_some());
        assert!(workbook.sheet("账本").is_some());

        let expenses = workbook.find_sheet(EXPENSE_SHEET_NAMES).unwrap();
        assert_eq!(expenses.name(), "花销");
        let columns = ColumnMap::for_sheet(expenses, EXPENSE_HEADERS);
        for field in [
            ExpenseColumn::Date,
            ExpenseColumn::TimeRange,
            ExpenseColumn::Title,
            ExpenseColumn::Amount,
            ExpenseColumn::Category,
            ExpenseColumn::PayChannel,
            ExpenseColumn::VehicleNo,
            ExpenseColumn::Remark,
        ] {
            assert!(columns.column(field).is_some(), "{field:?} missing");
        }
    }
}
