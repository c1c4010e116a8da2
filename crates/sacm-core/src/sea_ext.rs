use sea_orm::{
    ColumnTrait, EntityTrait, QuerySelect, Select, SelectTwo,
    sea_query::{Expr, Func, SimpleExpr},
};

/// Offset pagination for list queries. `page` is 1-based.
pub trait OffsetPage {
    fn offset_page(self, per_page: u32, page: u32) -> Self;
}

impl<E> OffsetPage for Select<E>
where
    E: EntityTrait,
{
    fn offset_page(self, per_page: u32, page: u32) -> Self {
        let page = page.max(1);
        self.offset(u64::from(page - 1) * u64::from(per_page))
            .limit(u64::from(per_page))
    }
}

impl<E, F> OffsetPage for SelectTwo<E, F>
where
    E: EntityTrait,
    F: EntityTrait,
{
    fn offset_page(self, per_page: u32, page: u32) -> Self {
        let page = page.max(1);
        self.offset(u64::from(page - 1) * u64::from(per_page))
            .limit(u64::from(per_page))
    }
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%needle%'`.
///
/// `%`, `_` and `\` in the needle are matched literally.
pub fn contains_ci<C>(column: C, needle: &str) -> SimpleExpr
where
    C: ColumnTrait,
{
    Expr::expr(Func::lower(Expr::col(column))).like(like_pattern(needle))
}

fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
