//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Lesson, Verdict};
use crate::session::Session;

/// Messages the client can send over WebSocket. Session-scoped messages carry
/// the session id explicitly so the loop itself stays stateless.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        #[serde(rename = "sessionId")]
        session_id: Option<String>,
        locale: Option<String>,
    },
    ListLessons,
    GetLesson {
        #[serde(rename = "lessonId")]
        lesson_id: u32,
    },
    SubmitCode {
        #[serde(rename = "sessionId")]
        session_id: String,
        code: String,
    },
    ResetCode {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SelectLesson {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "lessonId")]
        lesson_id: u32,
    },
    Hint {
        #[serde(rename = "lessonId")]
        lesson_id: u32,
    },
    GetProgress {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    Lessons {
        lessons: Vec<LessonSummaryOut>,
        total: usize,
    },
    Lesson {
        lesson: LessonOut,
    },
    SubmitResult {
        verdict: Verdict,
        session: SessionOut,
    },
    Hint {
        text: String,
    },
    Error {
        message: String,
    },
}

/// Full lesson DTO used by both WS and HTTP.
#[derive(Debug, Serialize)]
pub struct LessonOut {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub concept: String,
    pub task: String,
    pub hint: String,
    #[serde(rename = "starterCode")]
    pub starter_code: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
    pub solution: String,
}

/// Shortened lesson DTO for the lesson-selector listing.
#[derive(Debug, Serialize)]
pub struct LessonSummaryOut {
    pub id: u32,
    pub title: String,
    pub description: String,
}

/// Session snapshot DTO.
#[derive(Debug, Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub locale: String,
    #[serde(rename = "activeLessonId")]
    pub active_lesson_id: u32,
    #[serde(rename = "editorText")]
    pub editor_text: String,
    #[serde(rename = "completedLessonIds")]
    pub completed_lesson_ids: Vec<u32>,
    pub streak: u32,
    #[serde(rename = "maxUnlockedLesson")]
    pub max_unlocked_lesson: u32,
}

pub fn to_lesson_out(l: &Lesson) -> LessonOut {
    LessonOut {
        id: l.id,
        title: l.title.clone(),
        description: l.description.clone(),
        concept: l.concept.clone(),
        task: l.task.clone(),
        hint: l.hint.clone(),
        starter_code: l.starter_code.clone(),
        expected_output: l.expected_output.clone(),
        solution: l.solution.clone(),
    }
}

pub fn to_lesson_summary_out(l: &Lesson) -> LessonSummaryOut {
    LessonSummaryOut {
        id: l.id,
        title: l.title.clone(),
        description: l.description.clone(),
    }
}

pub fn to_session_out(s: &Session) -> SessionOut {
    SessionOut {
        session_id: s.id.clone(),
        locale: match s.locale {
            crate::i18n::Locale::EnUs => "en-US".into(),
            crate::i18n::Locale::EsEs => "es-ES".into(),
        },
        active_lesson_id: s.active_lesson_id,
        editor_text: s.editor_text.clone(),
        completed_lesson_ids: s.completed_lesson_ids.iter().copied().collect(),
        streak: s.streak,
        max_unlocked_lesson: s.max_unlocked_lesson(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SessionIn {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    pub id: u32,
}

#[derive(Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub code: String,
}
#[derive(Serialize)]
pub struct SubmitOut {
    pub verdict: Verdict,
    pub session: SessionOut,
}

#[derive(Deserialize)]
pub struct ResetIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct SelectLessonIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "lessonId")]
    pub lesson_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    #[serde(rename = "lessonId")]
    pub lesson_id: u32,
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
