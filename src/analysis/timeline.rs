use crate::align::{AlignedFrame, align};
use crate::domain::QuarterlySeries;
use crate::error::{AppError, ErrorKind};

/// Aligned bank rate and house price, ready to chart on two axes.
pub fn timeline(bank_rate: &QuarterlySeries, house_price: &QuarterlySeries) -> Result<AlignedFrame, AppError> {
    let frame = align(&[bank_rate, house_price])?;
    if frame.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyData,
            format!("`{}` and `{}` share no quarters.", bank_rate.name(), house_price.name()),
        ));
    }
    Ok(frame)
}
