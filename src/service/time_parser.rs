//! Layouts carry no year. Missing calendar fields come from an anchor date:
//! its year for date-bearing layouts (the next leap year for Feb 29), the
//! matching weekday of its Monday-based week for weekday-only layouts.
//! Layouts without minutes imply minute zero.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::ScheduleError;
use crate::models::layout::{CalendarComponent, Layout};

#[derive(Debug, Clone)]
pub struct TimeParser {
    layouts: Vec<Layout>,
    anchor: NaiveDate,
}

impl TimeParser {
    pub fn new(layouts: Vec<Layout>, anchor: NaiveDate) -> Self {
        Self { layouts, anchor }
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn parse(&self, raw: &str) -> Result<(NaiveDateTime, Layout), ScheduleError> {
        try_parse_time(raw, &self.layouts, self.anchor)
            .map(|(instant, layout)| (instant, layout.clone()))
    }

    pub fn parse_with(&self, raw: &str, layout: &Layout) -> Result<NaiveDateTime, ScheduleError> {
        try_parse_time(raw, std::slice::from_ref(layout), self.anchor).map(|(instant, _)| instant)
    }

    pub fn parse_deadline(
        &self,
        raw: &str,
        layout: &Layout,
        on: NaiveDate,
    ) -> Result<NaiveDateTime, ScheduleError> {
        let raw = raw.trim();
        parse_pattern(raw, layout.time_only(), on).ok_or_else(|| ScheduleError::ParseFailure {
            input: raw.to_string(),
        })
    }
}

/// Returns the instant produced by the first layout in `layouts` that accepts
/// `raw`. Later layouts are never consulted once one succeeds.
pub fn try_parse_time<'a>(
    raw: &str,
    layouts: &'a [Layout],
    anchor: NaiveDate,
) -> Result<(NaiveDateTime, &'a Layout), ScheduleError> {
    let raw = raw.trim();
    for layout in layouts {
        if let Some(instant) = parse_pattern(raw, layout.pattern(), anchor) {
            debug!(layout = %layout, %instant, "parsed `{raw}`");
            return Ok((instant, layout));
        }
    }
    debug!(candidates = layouts.len(), "no layout matched `{raw}`");
    Err(ScheduleError::ParseFailure {
        input: raw.to_string(),
    })
}

fn parse_pattern(raw: &str, pattern: &str, anchor: NaiveDate) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, raw, StrftimeItems::new(pattern)).ok()?;
    let component = CalendarComponent::of(pattern);
    let resolved = candidate_dates(component, anchor)
        .into_iter()
        .find_map(|date| resolve(parsed.clone(), date));
    if resolved.is_some() || component != CalendarComponent::Date {
        return resolved;
    }
    // Feb 29 in a common anchor year moves to the next leap year.
    next_leap_year(anchor)
        .and_then(|leap| resolve(parsed, leap))
        .filter(|instant| instant.month() == 2 && instant.day() == 29)
}

fn candidate_dates(component: CalendarComponent, anchor: NaiveDate) -> Vec<NaiveDate> {
    match component {
        CalendarComponent::Date | CalendarComponent::TimeOnly => vec![anchor],
        CalendarComponent::Weekday => week_of(anchor),
    }
}

fn next_leap_year(anchor: NaiveDate) -> Option<NaiveDate> {
    (anchor.year()..anchor.year() + 8)
        .find_map(|year| NaiveDate::from_ymd_opt(year, 2, 29))
        .filter(|leap| leap.year() != anchor.year())
}

fn week_of(anchor: NaiveDate) -> Vec<NaiveDate> {
    let offset = u64::from(anchor.weekday().num_days_from_monday());
    let monday = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);
    (0..7)
        .filter_map(|i| monday.checked_add_days(Days::new(i)))
        .collect()
}

fn resolve(mut parsed: Parsed, date: NaiveDate) -> Option<NaiveDateTime> {
    // Setters reject values that conflict with parsed input, so these only
    // fill fields the layout left out.
    let _ = parsed.set_year(i64::from(date.year()));
    let _ = parsed.set_month(i64::from(date.month()));
    let _ = parsed.set_day(i64::from(date.day()));
    let _ = parsed.set_minute(0);
    parsed.to_naive_datetime_with_offset(0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::LayoutProfile;
    use chrono::{NaiveTime, Weekday};

    fn anchor() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()
    }

    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    #[test]
    fn first_matching_layout_wins() {
        let parser = TimeParser::new(LayoutProfile::Dated.layouts(), anchor());
        let (instant, layout) = parser.parse("Jan 5 09:00").unwrap();
        assert_eq!(instant, at(1, 5, 9, 0));
        assert_eq!(layout.pattern(), "%b %d %H:%M");
    }

    #[test]
    fn earlier_layout_shadows_a_later_one_that_also_matches() {
        let first = Layout::new("%b %d %H:%M", "%H:%M");
        let second = Layout::new("%b %d %H:%M", "%I:%M%P");
        let layouts = vec![first.clone(), second.clone()];
        let (_, matched) = try_parse_time("Jan 5 09:00", &layouts, anchor()).unwrap();
        assert_eq!(matched, &first);

        let reversed = vec![second.clone(), first];
        let (_, matched) = try_parse_time("Jan 5 09:00", &reversed, anchor()).unwrap();
        assert_eq!(matched, &second);
    }

    #[test]
    fn falls_through_to_hour_only_layout() {
        let parser = TimeParser::new(LayoutProfile::Dated.layouts(), anchor());
        let (instant, layout) = parser.parse("Jan 5 3pm").unwrap();
        assert_eq!(instant, at(1, 5, 15, 0));
        assert_eq!(layout.pattern(), "%b %d %I%P");
    }

    #[test]
    fn reports_failure_when_nothing_matches() {
        let parser = TimeParser::new(LayoutProfile::Dated.layouts(), anchor());
        let err = parser.parse("tomorrow-ish").unwrap_err();
        assert_eq!(
            err,
            ScheduleError::ParseFailure {
                input: "tomorrow-ish".to_string()
            }
        );
    }

    #[test]
    fn leap_day_parses_in_a_common_anchor_year() {
        let parser = TimeParser::new(LayoutProfile::Dated.layouts(), anchor());
        let (instant, _) = parser.parse("Feb 29 09:00").unwrap();
        assert_eq!(
            instant,
            NaiveDate::from_ymd_opt(2028, 2, 29)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        );

        let (march, _) = parser.parse("Mar 1 09:00").unwrap();
        assert_eq!(march, at(3, 1, 9, 0));
        assert!(parser.parse("Feb 30 09:00").is_err());
    }

    #[test]
    fn input_is_trimmed() {
        let parser = TimeParser::new(LayoutProfile::Dated.layouts(), anchor());
        let (instant, _) = parser.parse("  Jan 5 09:00\n").unwrap();
        assert_eq!(instant, at(1, 5, 9, 0));
    }

    #[test]
    fn weekday_only_layout_resolves_into_anchor_week() {
        let parser = TimeParser::new(LayoutProfile::Weekday.layouts(), anchor());
        let (instant, layout) = parser.parse("Fri 18:30").unwrap();
        assert_eq!(layout.pattern(), "%a %H:%M");
        assert_eq!(instant.weekday(), Weekday::Fri);
        assert_eq!(instant, at(1, 9, 18, 30));

        let (monday, _) = parser.parse("Mon 9am").unwrap();
        assert_eq!(monday, at(1, 5, 9, 0));
    }

    #[test]
    fn weekday_contradicting_the_date_is_rejected() {
        let parser = TimeParser::new(LayoutProfile::Weekday.layouts(), anchor());
        assert!(parser.parse("Mon Jan 5 09:00").is_ok());
        assert!(parser.parse("Tue Jan 5 09:00").is_err());
        // Jan 5 is a Wednesday in the next leap year; that must not matter.
        assert!(parser.parse("Wed Jan 5 09:00").is_err());
        assert!(parser.parse("Tue Feb 29 09:00").is_ok());
    }

    #[test]
    fn pinned_layout_does_not_fall_back() {
        let layouts = LayoutProfile::Dated.layouts();
        let parser = TimeParser::new(layouts.clone(), anchor());
        assert!(parser.parse_with("Jan 5 3pm", &layouts[0]).is_err());
        assert_eq!(parser.parse_with("Jan 5 3pm", &layouts[1]), Ok(at(1, 5, 15, 0)));
    }

    #[test]
    fn deadline_uses_time_only_companion_on_given_date() {
        let layouts = LayoutProfile::Dated.layouts();
        let parser = TimeParser::new(layouts.clone(), anchor());
        let on = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(parser.parse_deadline("17:45", &layouts[0], on), Ok(at(3, 14, 17, 45)));
        assert!(parser.parse_deadline("Mar 14 17:45", &layouts[0], on).is_err());
    }
}
