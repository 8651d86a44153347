use super::*;
use crate::error::ErrorCode;
use crate::model::{Dosage, ExerciseId, RoutineId};
use crate::plan::{DailyPlan, PlannedExercise, PlannedRoutine};
use std::time::Duration;
use tokio::time::sleep;

fn squat(series: u32) -> PlannedExercise {
    PlannedExercise::new(ExerciseId(1), "Squat", series, Dosage::parse("10 repeticiones").unwrap())
}

fn plank(series: u32, seconds: u32) -> PlannedExercise {
    PlannedExercise::new(ExerciseId(2), "Plank", series, Dosage::timed(seconds))
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn phases(transitions: &[Transition]) -> Vec<(Phase, Phase)> {
    transitions.iter().map(|t| (t.from, t.to)).collect()
}

mod state_machine {
    use super::*;

    fn started(plan: &DailyPlan) -> ExecutionSession {
        let mut session = ExecutionSession::new(plan, DEFAULT_REST_SECONDS);
        session.start_routine().unwrap();
        session
    }

    #[test]
    fn test_new_session_waits_at_welcome() {
        let session = ExecutionSession::new(&DailyPlan::single("R", vec![squat(1)]), 60);
        assert_eq!(session.phase(), Phase::Welcome);
        assert!(session.id().as_str().starts_with("session-"));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.exercise_count, 1);
        assert!(snapshot.exercise.is_none());
    }

    #[test]
    fn test_begin_exercise_is_rejected_from_welcome() {
        let mut session = ExecutionSession::new(&DailyPlan::single("R", vec![squat(1)]), 60);
        let err = session.begin_exercise().unwrap_err();
        assert_eq!(err.code(), ErrorCode::EXEC_INVALID_TRANSITION);
        assert_eq!(session.phase(), Phase::Welcome);
    }

    #[test]
    fn test_empty_plan_finishes_without_detail() {
        let session = started(&DailyPlan::default());
        assert_eq!(session.phase(), Phase::RoutineFinished);
        assert!(session
            .transitions()
            .iter()
            .all(|t| t.to != Phase::ExerciseDetail));
    }

    #[test]
    fn test_routines_without_exercises_count_as_empty() {
        let plan = DailyPlan::new(vec![PlannedRoutine {
            routine_id: RoutineId(4),
            routine_name: "Vacía".to_string(),
            exercises: Vec::new(),
        }]);
        assert_eq!(started(&plan).phase(), Phase::RoutineFinished);
    }

    #[test]
    fn test_three_series_rest_twice_then_advance_once() {
        let plan = DailyPlan::single("R", vec![squat(3), squat(1)]);
        let mut session = started(&plan);
        session.begin_exercise().unwrap();
        for _ in 0..2 {
            assert_eq!(session.complete_series().unwrap(), Phase::Resting);
            for _ in 0..DEFAULT_REST_SECONDS {
                session.tick().unwrap();
            }
            assert_eq!(session.phase(), Phase::Executing);
        }
        assert_eq!(session.snapshot().series_number, 3);
        assert_eq!(session.complete_series().unwrap(), Phase::ExerciseDetail);

        let from_executing: Vec<_> = session
            .transitions()
            .iter()
            .filter(|t| t.from == Phase::Executing)
            .map(|t| t.to)
            .collect();
        assert_eq!(
            from_executing,
            vec![Phase::Resting, Phase::Resting, Phase::ExerciseDetail]
        );
        assert_eq!(session.snapshot().exercise_index, 1);
    }

    #[test]
    fn test_rest_never_advances_exercise() {
        let mut session = started(&DailyPlan::single("R", vec![squat(2), plank(1, 5)]));
        session.begin_exercise().unwrap();
        session.complete_series().unwrap();
        for _ in 0..DEFAULT_REST_SECONDS {
            session.tick().unwrap();
        }
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Executing);
        assert_eq!(snapshot.exercise_index, 0);
        assert_eq!(snapshot.series_number, 2);
        assert_eq!(snapshot.remaining_seconds, None);
    }

    #[test]
    fn test_timed_series_expires_into_same_branch() {
        let mut session = started(&DailyPlan::single("R", vec![plank(2, 3), squat(1)]));
        session.begin_exercise().unwrap();
        assert_eq!(session.snapshot().remaining_seconds, Some(3));
        assert_eq!(session.tick().unwrap(), None);
        assert_eq!(session.tick().unwrap(), None);
        assert_eq!(session.tick().unwrap(), Some(Phase::Resting));
        assert_eq!(session.snapshot().remaining_seconds, Some(DEFAULT_REST_SECONDS));
        assert_eq!(session.transitions().last().unwrap().trigger, Trigger::Timer);

        for _ in 0..DEFAULT_REST_SECONDS {
            session.tick().unwrap();
        }
        // next timed series gets a fresh countdown
        assert_eq!(session.snapshot().remaining_seconds, Some(3));
        for _ in 0..3 {
            session.tick().unwrap();
        }
        assert_eq!(session.phase(), Phase::ExerciseDetail);
        assert_eq!(session.snapshot().exercise.unwrap().name, "Squat");
    }

    #[test]
    fn test_manual_completion_of_timed_series() {
        let mut session = started(&DailyPlan::single("R", vec![plank(1, 30)]));
        session.begin_exercise().unwrap();
        session.tick().unwrap();
        assert_eq!(session.complete_series().unwrap(), Phase::RoutineFinished);
    }

    #[test]
    fn test_tick_without_countdown_is_integrity_error() {
        let mut session = started(&DailyPlan::single("R", vec![squat(1)]));
        assert!(matches!(
            session.tick(),
            Err(crate::error::PlannerError::TimerIntegrity { .. })
        ));
        session.begin_exercise().unwrap();
        // rep-based series have no countdown
        assert!(session.tick().is_err());
    }

    #[test]
    fn test_complete_series_outside_executing_is_rejected() {
        let mut session = started(&DailyPlan::single("R", vec![squat(2)]));
        assert!(session.complete_series().is_err());
        session.begin_exercise().unwrap();
        session.complete_series().unwrap();
        assert_eq!(
            session.complete_series().unwrap_err().code(),
            ErrorCode::EXEC_INVALID_TRANSITION
        );
    }

    #[test]
    fn test_zero_rest_goes_straight_to_next_series() {
        let mut session = ExecutionSession::new(&DailyPlan::single("R", vec![squat(2)]), 0);
        session.start_routine().unwrap();
        session.begin_exercise().unwrap();
        assert_eq!(session.complete_series().unwrap(), Phase::Executing);
        assert_eq!(session.snapshot().series_number, 2);
    }

    #[test]
    fn test_exercises_flatten_across_routines() {
        let plan = DailyPlan::new(vec![
            PlannedRoutine {
                routine_id: RoutineId(1),
                routine_name: "Mañana".to_string(),
                exercises: vec![squat(1)],
            },
            PlannedRoutine {
                routine_id: RoutineId(2),
                routine_name: "Tarde".to_string(),
                exercises: vec![plank(1, 10)],
            },
        ]);
        let mut session = started(&plan);
        assert_eq!(session.snapshot().routine_name.as_deref(), Some("Mañana"));
        session.begin_exercise().unwrap();
        session.complete_series().unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.routine_name.as_deref(), Some("Tarde"));
        assert_eq!(snapshot.exercise_index, 1);

        let summary = session.summary();
        assert_eq!(summary.exercises_completed, 1);
        assert!(!summary.finished);
    }
}

mod engine_runtime {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_scenario_rep_based_with_rest() {
        let engine = ExecutionEngine::default();
        let plan = DailyPlan::single("Piernas", vec![squat(2)]);

        let welcome = engine.open(&plan).await;
        assert_eq!(welcome.phase, Phase::Welcome);
        assert!(engine.begin_exercise().await.is_err());

        let detail = engine.start_routine().await.unwrap();
        assert_eq!(detail.phase, Phase::ExerciseDetail);

        let executing = engine.begin_exercise().await.unwrap();
        assert_eq!(executing.phase, Phase::Executing);
        assert_eq!(executing.series_number, 1);
        assert_eq!(executing.remaining_seconds, None);
        assert!(!engine.timer_active().await);

        let resting = engine.complete_series().await.unwrap();
        assert_eq!(resting.phase, Phase::Resting);
        assert_eq!(resting.series_number, 2);
        assert_eq!(resting.remaining_seconds, Some(60));
        assert!(engine.timer_active().await);

        sleep(secs(10.5)).await;
        assert_eq!(engine.current_state().await.unwrap().remaining_seconds, Some(50));

        sleep(secs(50.0)).await;
        let state = engine.current_state().await.unwrap();
        assert_eq!(state.phase, Phase::Executing);
        assert_eq!(state.series_number, 2);
        assert!(!engine.timer_active().await);

        let finished = engine.complete_series().await.unwrap();
        assert_eq!(finished.phase, Phase::RoutineFinished);
        assert_eq!(engine.integrity_violations().await, 0);

        let summary = engine.finish().await.unwrap();
        assert!(summary.finished);
        assert_eq!(summary.series_completed, 2);
        assert!(engine.current_state().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_empty_plan() {
        let engine = ExecutionEngine::default();
        let snapshot = engine.start(&DailyPlan::default()).await.unwrap();
        assert_eq!(snapshot.phase, Phase::RoutineFinished);
        assert_eq!(
            phases(&engine.transitions().await),
            vec![(Phase::Welcome, Phase::RoutineFinished)]
        );
        assert!(!engine.timer_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_timed_exercise_finishes_by_itself() {
        let engine = ExecutionEngine::default();
        engine
            .start(&DailyPlan::single("Core", vec![plank(1, 30)]))
            .await
            .unwrap();
        let executing = engine.begin_exercise().await.unwrap();
        assert_eq!(executing.remaining_seconds, Some(30));

        sleep(secs(29.5)).await;
        let state = engine.current_state().await.unwrap();
        assert_eq!(state.phase, Phase::Executing);
        assert_eq!(state.remaining_seconds, Some(1));

        sleep(secs(1.0)).await;
        let state = engine.current_state().await.unwrap();
        assert_eq!(state.phase, Phase::RoutineFinished);
        assert!(!engine.timer_active().await);

        let last = engine.transitions().await.pop().unwrap();
        assert_eq!(last.trigger, Trigger::Timer);
        assert_eq!(engine.integrity_violations().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_back_cancels_timer_with_no_further_mutation() {
        let engine = ExecutionEngine::default();
        engine
            .start(&DailyPlan::single("Core", vec![plank(2, 30)]))
            .await
            .unwrap();
        engine.begin_exercise().await.unwrap();
        engine.go_back().await.unwrap();

        assert!(engine.current_state().await.is_none());
        assert!(!engine.timer_active().await);
        sleep(secs(300.0)).await;
        assert!(engine.current_state().await.is_none());
        assert!(engine.transitions().await.is_empty());
        assert_eq!(engine.integrity_violations().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_during_rest_cancels_timer() {
        let engine = ExecutionEngine::default();
        engine
            .start(&DailyPlan::single("R", vec![squat(3)]))
            .await
            .unwrap();
        engine.begin_exercise().await.unwrap();
        engine.complete_series().await.unwrap();
        sleep(secs(5.5)).await;

        let summary = engine.finish().await.unwrap();
        assert!(!summary.finished);
        assert_eq!(summary.series_completed, 1);

        sleep(secs(120.0)).await;
        assert!(engine.current_state().await.is_none());
        assert_eq!(engine.integrity_violations().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_back_begins_from_scratch() {
        let engine = ExecutionEngine::default();
        let plan = DailyPlan::single("R", vec![squat(3)]);
        engine.start(&plan).await.unwrap();
        engine.begin_exercise().await.unwrap();
        engine.complete_series().await.unwrap();
        sleep(secs(60.5)).await;
        assert_eq!(engine.current_state().await.unwrap().series_number, 2);
        engine.go_back().await.unwrap();

        let detail = engine.start(&plan).await.unwrap();
        assert_eq!(detail.phase, Phase::ExerciseDetail);
        assert_eq!(detail.exercise_index, 0);
        assert_eq!(detail.series_number, 1);
        assert_eq!(engine.begin_exercise().await.unwrap().series_number, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_series_progression_through_engine() {
        let engine = ExecutionEngine::default();
        engine
            .start(&DailyPlan::single("R", vec![squat(3)]))
            .await
            .unwrap();
        engine.begin_exercise().await.unwrap();
        for _ in 0..2 {
            engine.complete_series().await.unwrap();
            sleep(secs(60.5)).await;
        }
        engine.complete_series().await.unwrap();

        let transitions = engine.transitions().await;
        let rests = transitions
            .iter()
            .filter(|t| t.from == Phase::Executing && t.to == Phase::Resting)
            .count();
        let exits = transitions
            .iter()
            .filter(|t| t.from == Phase::Executing && t.to != Phase::Resting)
            .count();
        assert_eq!((rests, exits), (2, 1));
        assert_eq!(transitions.last().unwrap().to, Phase::RoutineFinished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completing_timed_series_early_replaces_timer() {
        let engine = ExecutionEngine::default();
        engine
            .start(&DailyPlan::single("Core", vec![plank(2, 30)]))
            .await
            .unwrap();
        engine.begin_exercise().await.unwrap();
        sleep(secs(10.5)).await;

        let resting = engine.complete_series().await.unwrap();
        assert_eq!(resting.remaining_seconds, Some(60));
        // the series countdown is gone, only the rest countdown runs
        sleep(secs(20.25)).await;
        let state = engine.current_state().await.unwrap();
        assert_eq!(state.phase, Phase::Resting);
        assert_eq!(state.remaining_seconds, Some(40));
        assert_eq!(engine.integrity_violations().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_rest_interval() {
        let engine = ExecutionEngine::new(Duration::from_secs(5));
        assert_eq!(engine.rest_seconds(), 5);
        engine
            .start(&DailyPlan::single("R", vec![squat(2)]))
            .await
            .unwrap();
        engine.begin_exercise().await.unwrap();
        engine.complete_series().await.unwrap();
        sleep(secs(5.5)).await;
        assert_eq!(engine.current_state().await.unwrap().phase, Phase::Executing);
    }

    #[tokio::test]
    async fn test_actions_without_session_are_rejected() {
        let engine = ExecutionEngine::default();
        assert_eq!(
            engine.complete_series().await.unwrap_err().code(),
            ErrorCode::EXEC_SESSION_CLOSED
        );
        assert!(engine.go_back().await.is_err());
        assert!(engine.finish().await.is_err());
        assert!(engine.current_state().await.is_none());
    }

    #[tokio::test]
    async fn test_go_back_is_not_offered_once_finished() {
        let engine = ExecutionEngine::default();
        engine.start(&DailyPlan::default()).await.unwrap();
        assert_eq!(
            engine.go_back().await.unwrap_err().code(),
            ErrorCode::EXEC_INVALID_TRANSITION
        );
        assert!(engine.finish().await.unwrap().finished);
    }
}
