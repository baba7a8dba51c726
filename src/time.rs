use chrono::Utc;

/// Текущее время в наносекундах от начала эпохи Unix.
///
/// Используется для `source_timestamp` при отправке и для
/// `received_timestamp` при постановке сообщения в очередь. Возвращает 0,
/// если значение не помещается в `i64` (после 2262 года).
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}
