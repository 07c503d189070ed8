//! Per-type column mappings
//!
//! Keys are the camel-case labels derived from each tab's headers. Columns the
//! spreadsheet computes for itself (counts, scores, generated links) are
//! accepted and ignored.

use crate::domain::{narrator_rating, rating, Author, Book, Narrator, Series, Tag, Watch};

use super::adapter::{cell_bool, cell_date, cell_float, cell_int, cell_list, cell_text, CellError, SheetRow};
use super::source::CellValue;

/// Marks a book as being read or abandoned instead of finished
const READING_SENTINEL: &str = "reading";
const DNF_SENTINEL: &str = "DNF";

fn unknown(key: &str) -> CellError {
    CellError::UnknownKey(key.to_string())
}

fn book_rating_key(key: &str) -> Option<&'static str> {
    match key {
        "rateCharacters" => Some(rating::CHARACTER_DEPTH),
        "rateGrowth" => Some(rating::CHARACTER_GROWTH),
        "rateConsistency" => Some(rating::CHARACTER_CONSISTENCY),
        "rateWorld" => Some(rating::WORLD),
        "rateTension" => Some(rating::TENSION),
        "rateBplot" => Some(rating::B_PLOT),
        "rateVibe" => Some(rating::VIBE),
        "rateResolution" | "rateHea" => Some(rating::HEA),
        "rateOverall" => Some(rating::OVERALL),
        _ => None,
    }
}

fn set_rating(
    ratings: &mut std::collections::BTreeMap<String, f64>,
    category: &str,
    cell: &CellValue,
) -> Result<(), CellError> {
    if let Some(value) = cell_float(cell)? {
        ratings.insert(category.to_string(), value);
    }
    Ok(())
}

impl SheetRow for Book {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        if let Some(category) = book_rating_key(key) {
            return set_rating(&mut self.ratings, category, cell);
        }
        if key.starts_with("tag") && key[3..].parse::<u8>().is_ok() {
            self.tags.extend(cell_list(cell));
            return Ok(());
        }

        match key {
            "bookTitle" => self.title = cell_text(cell),
            "bookAuthor" => self.author_name = cell_text(cell),
            "bookPages" => self.pages = cell_int(cell)?,
            "bookPublisher" => self.publisher_name = cell_text(cell),
            "audiobookNarrator" => self.narrator_name = cell_text(cell),
            "audiobookDurationHours" => self.duration_hours = cell_float(cell)?,
            "datePublish" => self.date_publish = cell_date(cell)?,
            "datePurchase" => self.date_purchase = cell_date(cell)?,
            "dateRead" => match cell_text(cell) {
                Some(text) if text.contains(READING_SENTINEL) => self.reading = Some(true),
                Some(text) if text.contains(DNF_SENTINEL) => self.dnf = Some(true),
                _ => self.date_read = cell_date(cell)?,
            },
            "bookDnf" => {
                if let Some(dnf) = cell_bool(cell)? {
                    self.dnf = Some(dnf);
                }
            }
            "isbn" => self.isbn = cell_text(cell).filter(|s| s != "null"),
            "linkGoodreads" => self.goodreads_url = cell_text(cell),
            "linkAudiobookstore" => self.audiobook_store_url = cell_text(cell),
            "linkStorygraph" => self.storygraph_url = cell_text(cell),
            "linkImage" => self.image_url = cell_text(cell),
            "seriesName" => self.series_name = cell_text(cell),
            "seriesPart" => self.series_part = cell_text(cell),
            "catEra" => self.genre = cell_text(cell),
            "genTagsJoined" | "genStars" | "genNotes" | "genDescription" | "genMdLink" | "genPlainTitle"
            | "calcAuthorBookCount" | "calcNarratorBookCount" | "calcDurationFilled" | "scoreOverall" => {}
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

impl SheetRow for Author {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        if let Some(category) = book_rating_key(key) {
            return set_rating(&mut self.ratings, category, cell);
        }

        match key {
            "authorName" => self.name = cell_text(cell),
            "authorPronouns" => self.pronouns = cell_text(cell),
            "authorGoodreadsLink" => self.goodreads_url = cell_text(cell),
            "authorAudiobookstoreLink" => self.audiobook_store_url = cell_text(cell),
            "authorStorygraphLink" => self.story_graph_url = cell_text(cell),
            "authorSiteLink" => self.site_url = cell_text(cell),
            "authorBookCount" => self.owned_count = cell_int(cell)?,
            "authorRatedCount" => self.rated_count = cell_int(cell)?,
            "rateDnfCount" => self.dnf_count = cell_int(cell)?,
            "rate5" => self.five_star_count = cell_int(cell)?,
            "rateMin" => self.min_rating = cell_float(cell)?,
            "rateMax" => self.max_rating = cell_float(cell)?,
            "statsAvgPages" => self.mean_pages = cell_float(cell)?,
            "statsAvgDuration" => self.mean_duration_hours = cell_float(cell)?,
            "rateRange" | "statsStars" | "genGoodreads" | "genRating" => {}
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

fn narrator_rating_key(key: &str) -> Option<&'static str> {
    match key {
        "rateFemme" => Some(narrator_rating::FEMME),
        "rateMasc" => Some(narrator_rating::MASC),
        "rateMen" => Some(narrator_rating::MEN),
        "rateKids" => Some(narrator_rating::KIDS),
        "rateVariety" => Some(narrator_rating::VARIETY),
        "rateClarity" => Some(narrator_rating::CLARITY),
        "rateAccents" => Some(narrator_rating::ACCENTS),
        "rateEmotion" => Some(narrator_rating::EMOTION),
        "rateDistinctNarrator" => Some(narrator_rating::DISTINCT_NARRATOR),
        _ => None,
    }
}

impl SheetRow for Narrator {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        if let Some(category) = narrator_rating_key(key) {
            return set_rating(&mut self.ratings, category, cell);
        }

        match key {
            "narratorName" => self.name = cell_text(cell),
            "narratorAccent" => self.accent = cell_text(cell),
            "narratorGoodreadsLink" => self.goodreads_url = cell_text(cell),
            "narratorSiteLink" => self.site_url = cell_text(cell),
            "narratorBookCount" => self.owned_count = cell_int(cell)?,
            "statsTotalDuration" => self.total_duration_hours = cell_float(cell)?,
            "statsTotalPages" => self.total_pages = cell_int(cell)?,
            "negNeg1" | "negNeg2" | "negNeg3" => self.negatives.extend(cell_list(cell)),
            "negOverallRating" | "statsAvgPph" | "statsBookCount" | "statsMeanBookRating" | "statsReadCount"
            | "statsStars" | "genGoodreadsMarkdownLink" => {}
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

impl SheetRow for Series {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        match key {
            "seriesName" => self.name = cell_text(cell),
            "linkGoodreads" => self.goodreads_url = cell_text(cell),
            "linkAudiobookstore" => self.audiobook_store_url = cell_text(cell),
            "linkStorygraph" => self.story_graph_url = cell_text(cell),
            "statsBookCount" => self.owned_count = cell_int(cell)?,
            "statsAvgRating" => set_rating(&mut self.ratings, rating::OVERALL, cell)?,
            "statsStars" => {}
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

impl SheetRow for Tag {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        match key {
            "tagName" => self.name = cell_text(cell),
            "tagDescription" => self.description = cell_text(cell),
            "countTotal" => self.owned_count = cell_int(cell)?,
            "countRated" => self.rated_count = cell_int(cell)?,
            "countHours" => self.rated_duration_hours = cell_float(cell)?,
            "rateAvgOverall" => set_rating(&mut self.ratings, rating::OVERALL, cell)?,
            "calcPositiveRate" => self.positive_rate = cell_float(cell)?,
            "calcPositiveDuration" => self.positive_duration_hours = cell_float(cell)?,
            "calcLikelihoodOfPositive" => self.positive_likelihood = cell_float(cell)?,
            "calcEffectiveLike" => self.effective_like = cell_float(cell)?,
            "rateStars" | "calcSumDurationPlusMinus" => {}
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

impl SheetRow for Watch {
    fn set_cell(&mut self, key: &str, cell: &CellValue) -> Result<(), CellError> {
        match key {
            "watchlistBookTitle" => self.book_title = cell_text(cell),
            "watchlistAuthor" => self.author_name = cell_text(cell),
            "linkGoodreads" => self.goodreads_url = cell_text(cell),
            _ => return Err(unknown(key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn book_cells() {
        let mut book = Book::default();
        book.set_cell("bookTitle", &text("The Fish")).unwrap();
        book.set_cell("bookAuthor", &text(" Ana Example ")).unwrap();
        book.set_cell("bookPages", &text("1,024")).unwrap();
        book.set_cell("audiobookDurationHours", &CellValue::Number(9.5)).unwrap();
        book.set_cell("datePublish", &text("2019-05-01")).unwrap();
        book.set_cell("rateOverall", &text("4.5")).unwrap();
        book.set_cell("tag1", &text("slow-burn")).unwrap();
        book.set_cell("tag2", &text("found-family")).unwrap();
        book.set_cell("genStars", &text("4\u{bd}")).unwrap();

        assert_eq!(book.title.as_deref(), Some("The Fish"));
        assert_eq!(book.author_name.as_deref(), Some("Ana Example"));
        assert_eq!(book.pages, Some(1024));
        assert_eq!(book.duration_hours, Some(9.5));
        assert_eq!(book.date_publish, NaiveDate::from_ymd_opt(2019, 5, 1));
        assert_eq!(book.ratings.get(rating::OVERALL), Some(&4.5));
        assert_eq!(book.tags.len(), 2);
    }

    #[test]
    fn date_read_sentinels() {
        let mut book = Book::default();
        book.set_cell("dateRead", &text("reading")).unwrap();
        assert_eq!(book.reading, Some(true));
        assert_eq!(book.date_read, None);

        let mut book = Book::default();
        book.set_cell("dateRead", &text("DNF")).unwrap();
        assert_eq!(book.dnf, Some(true));

        let mut book = Book::default();
        book.set_cell("dateRead", &text("2022-01-02")).unwrap();
        assert_eq!(book.date_read, NaiveDate::from_ymd_opt(2022, 1, 2));
    }

    #[test]
    fn dnf_checkbox_column() {
        let mut book = Book::default();
        book.set_cell("bookDnf", &CellValue::Bool(true)).unwrap();
        assert_eq!(book.dnf, Some(true));

        let mut book = Book::default();
        book.set_cell("dateRead", &text("DNF")).unwrap();
        book.set_cell("bookDnf", &CellValue::Empty).unwrap();
        assert_eq!(book.dnf, Some(true));

        let mut book = Book::default();
        book.set_cell("bookDnf", &text("no")).unwrap();
        assert_eq!(book.dnf, Some(false));
        assert!(book.set_cell("bookDnf", &text("sort of")).is_err());
    }

    #[test]
    fn non_finite_ratings_are_rejected() {
        let mut author = Author::default();
        assert!(author.set_cell("rateMin", &text("NaN")).is_err());
        assert!(author.set_cell("rateMax", &text("inf")).is_err());
        assert_eq!(author.min_rating, None);
        assert_eq!(author.max_rating, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut watch = Watch::default();
        assert_eq!(
            watch.set_cell("watchlistPriority", &text("high")),
            Err(CellError::UnknownKey("watchlistPriority".to_string()))
        );
        let mut book = Book::default();
        assert!(book.set_cell("tagline", &text("x")).is_err());
    }

    #[test]
    fn percentages_and_ratings() {
        let mut tag = Tag::default();
        tag.set_cell("tagName", &text("enemies-to-lovers")).unwrap();
        tag.set_cell("calcPositiveRate", &text("80%")).unwrap();
        tag.set_cell("rateAvgOverall", &text("")).unwrap();
        assert_eq!(tag.positive_rate, Some(0.8));
        assert!(tag.ratings.is_empty());

        let mut narrator = Narrator::default();
        narrator.set_cell("rateClarity", &CellValue::Number(5.0)).unwrap();
        narrator.set_cell("negNeg1", &text("breathy")).unwrap();
        assert_eq!(narrator.ratings.get(narrator_rating::CLARITY), Some(&5.0));
        assert!(narrator.negatives.contains("breathy"));
    }
}
