//! Engine values rendered as API bodies.

use api_types::{
    attachment::AttachmentView,
    book::BookView,
    expense::{ExpenseListResponse, ExpenseView, Pagination},
    pay_channel::PayChannelView,
    preview::PreviewStatus,
    stats::{DailyStat, GroupStat, LeaderboardItem, LeaderboardResponse, SummaryStats},
};
use engine::{
    Attachment, Book, BookSummary, DailyTotal, Expense, ExpensePage, GroupTotal, Leaderboard,
    PayChannel, PayChannelRegistry,
};

pub fn book(book: Book) -> BookView {
    BookView {
        id: book.id,
        name: book.name,
        start_date: book.start_date,
        end_date: book.end_date,
        description: book.description,
        summary: book.summary,
        created_at: book.created_at,
        updated_at: book.updated_at,
    }
}

pub fn expense(expense: Expense, registry: &PayChannelRegistry) -> ExpenseView {
    ExpenseView {
        net_amount: expense.net_amount(),
        pay_channel_label: registry.label_for(expense.pay_channel.as_deref()),
        category: expense.category.code().to_string(),
        category_label: expense.category.label().to_string(),
        id: expense.id,
        book_id: expense.book_id,
        date: expense.date,
        time_range: expense.time_range,
        duration_minutes: expense.duration_minutes,
        duration_display: expense.duration_display,
        title: expense.title,
        amount: expense.amount,
        discount_amount: expense.discount_amount,
        discount_note: expense.discount_note,
        currency: expense.currency,
        vehicle_no: expense.vehicle_no,
        pay_channel: expense.pay_channel,
        remark: expense.remark,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

pub fn expense_page(page: ExpensePage, registry: &PayChannelRegistry) -> ExpenseListResponse {
    ExpenseListResponse {
        items: page
            .items
            .into_iter()
            .map(|item| expense(item, registry))
            .collect(),
        pagination: Pagination {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages: page.total_pages,
        },
    }
}

pub fn attachment(attachment: Attachment) -> AttachmentView {
    AttachmentView {
        id: attachment.id,
        expense_id: attachment.expense_id,
        file_name: attachment.file_name,
        original_name: attachment.original_name,
        mime_type: attachment.mime_type,
        size_bytes: attachment.size_bytes,
        created_at: attachment.created_at,
    }
}

pub fn pay_channel(channel: PayChannel) -> PayChannelView {
    PayChannelView {
        id: channel.id,
        value: channel.value,
        label: channel.label,
    }
}

fn group(group: GroupTotal) -> GroupStat {
    GroupStat {
        name: group.name,
        count: group.totals.count,
        total_amount: group.totals.total_amount,
        saved_amount: group.totals.saved_amount,
    }
}

pub fn summary(summary: BookSummary) -> SummaryStats {
    SummaryStats {
        total_count: summary.totals.count,
        total_amount: summary.totals.total_amount,
        total_saved: summary.totals.saved_amount,
        net_amount: summary.totals.net_amount(),
        by_category: summary.by_category.into_iter().map(group).collect(),
        by_pay_channel: summary.by_pay_channel.into_iter().map(group).collect(),
    }
}

pub fn daily(days: Vec<DailyTotal>) -> Vec<DailyStat> {
    days.into_iter()
        .map(|day| DailyStat {
            net_amount: day.totals.net_amount(),
            date: day.date,
            count: day.totals.count,
            total_amount: day.totals.total_amount,
            saved_amount: day.totals.saved_amount,
        })
        .collect()
}

pub fn leaderboard(board: Leaderboard) -> LeaderboardResponse {
    LeaderboardResponse {
        total_count: board.totals.count,
        total_amount: board.totals.total_amount,
        total_saved: board.totals.saved_amount,
        net_amount: board.totals.net_amount(),
        items: board
            .items
            .into_iter()
            .map(|entry| LeaderboardItem {
                net_amount: entry.totals.net_amount(),
                book_id: entry.book_id,
                book_name: entry.book_name,
                count: entry.totals.count,
                total_amount: entry.totals.total_amount,
                saved_amount: entry.totals.saved_amount,
            })
            .collect(),
    }
}

pub fn preview_status(status: engine::PreviewStatus) -> PreviewStatus {
    PreviewStatus {
        enabled: status.enabled,
        enabled_until: status.enabled_until,
        preview_id: status.preview_id,
        show_receipts: status.show_receipts,
    }
}
