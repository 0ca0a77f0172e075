//! French public holidays.
//!
//! Eight holidays fall on the same month-day every year; Easter Monday,
//! Ascension Thursday and Whit Monday move with Easter Sunday and are
//! recomputed for each year.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Holiday {
    #[schema(example = "2025-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Noël", value_type = String)]
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct FixedHoliday {
    month: u32,
    day: u32,
    name: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct MoveableHoliday {
    /// Days after Easter Sunday.
    easter_offset: u64,
    name: &'static str,
}

const FRENCH_FIXED: &[FixedHoliday] = &[
    FixedHoliday { month: 1, day: 1, name: "Jour de l'an" },
    FixedHoliday { month: 5, day: 1, name: "Fête du Travail" },
    FixedHoliday { month: 5, day: 8, name: "Victoire 1945" },
    FixedHoliday { month: 7, day: 14, name: "Fête Nationale" },
    FixedHoliday { month: 8, day: 15, name: "Assomption" },
    FixedHoliday { month: 11, day: 1, name: "Toussaint" },
    FixedHoliday { month: 11, day: 11, name: "Armistice 1918" },
    FixedHoliday { month: 12, day: 25, name: "Noël" },
];

const FRENCH_MOVEABLE: &[MoveableHoliday] = &[
    MoveableHoliday { easter_offset: 1, name: "Lundi de Pâques" },
    MoveableHoliday { easter_offset: 39, name: "Ascension" },
    MoveableHoliday { easter_offset: 50, name: "Lundi de Pentecôte" },
];

/// A table of public holidays.
#[derive(Debug, Clone, Copy)]
pub struct HolidayCalendar {
    fixed: &'static [FixedHoliday],
    moveable: &'static [MoveableHoliday],
}

impl HolidayCalendar {
    pub const fn france() -> Self {
        Self {
            fixed: FRENCH_FIXED,
            moveable: FRENCH_MOVEABLE,
        }
    }

    /// All holidays of `year`, sorted by date.
    pub fn holidays_in(&self, year: i32) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = self
            .fixed
            .iter()
            .filter_map(|h| {
                NaiveDate::from_ymd_opt(year, h.month, h.day).map(|date| Holiday {
                    date,
                    name: h.name,
                })
            })
            .collect();

        if let Some(easter) = easter_sunday(year) {
            holidays.extend(self.moveable.iter().filter_map(|h| {
                easter
                    .checked_add_days(Days::new(h.easter_offset))
                    .map(|date| Holiday { date, name: h.name })
            }));
        }

        holidays.sort_by_key(|h| h.date);
        holidays
    }

    /// Name of the holiday falling on `date`, if any.
    pub fn holiday_on(&self, date: NaiveDate) -> Option<&'static str> {
        if let Some(h) = self
            .fixed
            .iter()
            .find(|h| h.month == date.month() && h.day == date.day())
        {
            return Some(h.name);
        }

        let easter = easter_sunday(date.year())?;
        let offset = u64::try_from((date - easter).num_days()).ok()?;
        self.moveable
            .iter()
            .find(|h| h.easter_offset == offset)
            .map(|h| h.name)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_on(date).is_some()
    }
}

/// Easter Sunday of `year` (Anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
