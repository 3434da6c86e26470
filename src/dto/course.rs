use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;
use uuid::Uuid;

use crate::state::{
    course::{Course, Hole},
    scoring::format_shots_received,
};

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HoleResponse {
    pub number: u8,
    pub par: u32,
    /// Stroke index, 1 = hardest.
    pub index: u8,
    pub name: Option<String>,
}

impl From<&Hole> for HoleResponse {
    fn from(hole: &Hole) -> Self {
        Self {
            number: hole.number,
            par: hole.par,
            index: hole.index,
            name: hole.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseResponse {
    pub holes: Vec<HoleResponse>,
    pub total_par: u32,
    pub front_nine_par: u32,
    pub back_nine_par: u32,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            holes: course.holes().iter().map(HoleResponse::from).collect(),
            total_par: course.total_par(),
            front_nine_par: course.front_nine_par(),
            back_nine_par: course.back_nine_par(),
        }
    }
}

/// Hole seen through a player's handicap.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HandicapHoleResponse {
    #[serde(flatten)]
    pub hole: HoleResponse,
    pub shots_received: u32,
    /// "No shots", "1 shot", "2 shots".
    pub shots_label: String,
}

impl HandicapHoleResponse {
    pub fn new(hole: &Hole, shots_received: u32) -> Self {
        Self {
            hole: hole.into(),
            shots_received,
            shots_label: format_shots_received(shots_received),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HoleInfoResponse {
    pub player_id: Uuid,
    pub handicap: u32,
    #[serde(flatten)]
    pub hole: HandicapHoleResponse,
}

/// Inputs of the shots-received calculator.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ShotsQuery {
    #[validate(range(max = 54))]
    pub handicap: u32,
    #[validate(range(min = 1, max = 18))]
    pub hole_index: u8,
}

/// Inputs of the net score calculator.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct NetScoreQuery {
    #[validate(range(min = 1, max = 30))]
    pub strokes: u32,
    #[validate(range(max = 54))]
    pub handicap: u32,
    #[validate(range(min = 1, max = 18))]
    pub hole_index: u8,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShotsResponse {
    pub shots_received: u32,
    pub shots_label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NetScoreResponse {
    pub net_score: i32,
    pub shots_received: u32,
}
