use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Run {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_run: NaiveDate,
    pub zipcode: Option<String>,
    pub approx_dist: f64,
    pub approx_time: i32,
    pub route_id: Option<Uuid>,
    pub commit_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub run_id: Uuid,
    pub question_id: i64,
    pub numeric_ans: Option<i32>,
    pub select_ans: Option<String>,
    pub text_ans: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub minimum: Option<i32>,
    pub maximum: Option<i32>,
}

/// Fixed question ids every run is rated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSlot {
    BeforeMood,
    DuringMood,
    AfterMood,
    Energy,
    Feeling,
    Location,
    Terrain,
    RouteType,
    Thoughts,
}

impl QuestionSlot {
    pub const ALL: [QuestionSlot; 9] = [
        QuestionSlot::BeforeMood,
        QuestionSlot::DuringMood,
        QuestionSlot::AfterMood,
        QuestionSlot::Energy,
        QuestionSlot::Feeling,
        QuestionSlot::Location,
        QuestionSlot::Terrain,
        QuestionSlot::RouteType,
        QuestionSlot::Thoughts,
    ];

    pub fn id(self) -> i64 {
        match self {
            QuestionSlot::BeforeMood => 1,
            QuestionSlot::DuringMood => 2,
            QuestionSlot::AfterMood => 3,
            QuestionSlot::Energy => 4,
            QuestionSlot::Feeling => 5,
            QuestionSlot::Location => 6,
            QuestionSlot::Terrain => 7,
            QuestionSlot::RouteType => 8,
            QuestionSlot::Thoughts => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Park,
    City,
    Neighborhood,
    Trail,
    Beach,
    Treadmill,
    Track,
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Park,
        Location::City,
        Location::Neighborhood,
        Location::Trail,
        Location::Beach,
        Location::Treadmill,
        Location::Track,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Location::ALL.into_iter().find(|l| l.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Park => "park",
            Location::City => "city",
            Location::Neighborhood => "neighborhood",
            Location::Trail => "trail",
            Location::Beach => "beach",
            Location::Treadmill => "treadmill",
            Location::Track => "track",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Location::Park => "Park",
            Location::City => "City",
            Location::Neighborhood => "Neighborhood",
            Location::Trail => "Trail",
            Location::Beach => "Beach",
            Location::Treadmill => "Treadmill",
            Location::Track => "Track",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Flat,
    Downhill,
    Uphill,
    Hills,
}

impl Terrain {
    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Flat => "flat",
            Terrain::Downhill => "downhill",
            Terrain::Uphill => "uphill",
            Terrain::Hills => "hills",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Terrain::Flat => "Flat",
            Terrain::Downhill => "Mostly Downhill",
            Terrain::Uphill => "Mostly Uphill",
            Terrain::Hills => "Rolling Hills",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    PointToPoint,
    OutAndBack,
    Treadmill,
    Track,
    Random,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::PointToPoint => "point_to_point",
            RouteType::OutAndBack => "out_and_back",
            RouteType::Treadmill => "treadmill",
            RouteType::Track => "track",
            RouteType::Random => "random",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RouteType::PointToPoint => "Point to point",
            RouteType::OutAndBack => "Out and back",
            RouteType::Treadmill => "Treadmill",
            RouteType::Track => "Track",
            RouteType::Random => "Random, rambling route",
        }
    }
}

/// One answer ready to be written alongside its run.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub question_id: i64,
    pub numeric_ans: Option<i32>,
    pub select_ans: Option<String>,
    pub text_ans: Option<String>,
}

impl NewRating {
    fn numeric(slot: QuestionSlot, value: i32) -> Self {
        Self {
            question_id: slot.id(),
            numeric_ans: Some(value),
            select_ans: None,
            text_ans: None,
        }
    }

    fn select(slot: QuestionSlot, value: &str) -> Self {
        Self {
            question_id: slot.id(),
            numeric_ans: None,
            select_ans: Some(value.to_string()),
            text_ans: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RunRatingsInput {
    #[validate(range(min = 1, max = 10, message = "Ratings must be between 1 and 10"))]
    pub before_mood: i32,
    #[validate(range(min = 1, max = 10, message = "Ratings must be between 1 and 10"))]
    pub during_mood: i32,
    #[validate(range(min = 1, max = 10, message = "Ratings must be between 1 and 10"))]
    pub after_mood: i32,
    #[validate(range(min = 1, max = 10, message = "Ratings must be between 1 and 10"))]
    pub energy: i32,
    #[validate(length(min = 1, max = 100, message = "Feeling must be 1-100 characters"))]
    pub feeling: String,
    pub location: Location,
    pub terrain: Terrain,
    pub route_type: RouteType,
    pub thoughts: Option<String>,
}

impl RunRatingsInput {
    /// Expands the form into one answer per fixed question, in question order.
    pub fn into_ratings(self) -> Vec<NewRating> {
        vec![
            NewRating::numeric(QuestionSlot::BeforeMood, self.before_mood),
            NewRating::numeric(QuestionSlot::DuringMood, self.during_mood),
            NewRating::numeric(QuestionSlot::AfterMood, self.after_mood),
            NewRating::numeric(QuestionSlot::Energy, self.energy),
            NewRating::select(QuestionSlot::Feeling, &self.feeling),
            NewRating::select(QuestionSlot::Location, self.location.as_str()),
            NewRating::select(QuestionSlot::Terrain, self.terrain.as_str()),
            NewRating::select(QuestionSlot::RouteType, self.route_type.as_str()),
            NewRating {
                question_id: QuestionSlot::Thoughts.id(),
                numeric_ans: None,
                select_ans: None,
                text_ans: self.thoughts.filter(|t| !t.trim().is_empty()),
            },
        ]
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRunRequest {
    pub date_run: NaiveDate,
    #[validate(length(max = 16, message = "Zipcode too long"))]
    pub zipcode: Option<String>,
    #[validate(range(min = 0.01, max = 500.0, message = "Distance must be between 0.01 and 500 miles"))]
    pub approx_dist: f64,
    #[validate(range(min = 1, max = 10000, message = "Time must be between 1 and 10000 minutes"))]
    pub approx_time: i32,
    pub route_id: Option<Uuid>,
    pub ratings: RunRatingsInput,
}

impl CreateRunRequest {
    /// Splits the request into the run row and its nine answers.
    pub fn into_parts(self) -> (NewRun, Vec<NewRating>) {
        let run = NewRun {
            date_run: self.date_run,
            zipcode: self.zipcode,
            approx_dist: self.approx_dist,
            approx_time: self.approx_time,
            route_id: self.route_id,
        };
        (run, self.ratings.into_ratings())
    }
}

/// A run row before it has been written.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub date_run: NaiveDate,
    pub zipcode: Option<String>,
    pub approx_dist: f64,
    pub approx_time: i32,
    pub route_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RunQuery {
    pub after: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RunDetail {
    #[serde(flatten)]
    pub run: Run,
    pub ratings: Vec<Rating>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoodMoment {
    Before,
    During,
    After,
}

impl MoodMoment {
    pub fn slot(self) -> QuestionSlot {
        match self {
            MoodMoment::Before => QuestionSlot::BeforeMood,
            MoodMoment::During => QuestionSlot::DuringMood,
            MoodMoment::After => QuestionSlot::AfterMood,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub moment: Option<MoodMoment>,
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodPoint {
    pub run_id: Uuid,
    pub date_run: NaiveDate,
    pub rating: i32,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub date_run: NaiveDate,
    pub distance: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationPoint {
    pub run_id: Uuid,
    pub date_run: NaiveDate,
    pub location: String,
    pub label: Option<&'static str>,
}
