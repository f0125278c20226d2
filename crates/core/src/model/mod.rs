mod answer;
mod category;
mod history;
mod ids;
mod question;
mod result;
mod session;

pub use answer::{Answer, ReviewAnswer};
pub use category::{CategoryIndex, QuizCategory, QuizSubcategory};
pub use history::{HISTORY_CAPACITY, History};
pub use ids::{ParseIdError, QuestionId, ResultId};
pub use question::{Question, QuestionSet, QuestionSetError, QuestionSetKey, QuizDocument};
pub use result::{QuizResult, project_result, score_percent};
pub use session::{Advance, QuizSession, ResultSlot, SessionError, SessionProgress, SessionState};
