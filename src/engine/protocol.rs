// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker command protocol.
//!
//! On the channel every request travels as a `(name, payload)` pair
//! ([`Request`]). Workers decode it into a typed [`Command`] before acting;
//! a name they do not implement, or a payload of the wrong kind, is a
//! [`ProtocolError`] that terminates the worker. Each request gets exactly one
//! [`Reply`] (except `close`, which gets none) and replies come back in
//! request order.
//!
//! | Command | Payload | Reply |
//! |---|---|---|
//! | `step` | one action per owned slot | `Step` |
//! | `reset` | none | `Observations` |
//! | `set_task` | task or "no task" | `Ack` |
//! | `advance_curriculum` | none | `Ack` |
//! | `set_dropout_proportion` | proportion | `Ack` |
//! | `seed` | seed | `Ack` |
//! | `set_level_distribution` | index | `Ack` |
//! | `render` | render mode | `Frames` |
//! | `close` | none | none |

use crate::errors::ProtocolError;
use crate::types::{RenderMode, StepBatch};

pub const STEP: &str = "step";
pub const RESET: &str = "reset";
pub const SET_TASK: &str = "set_task";
pub const ADVANCE_CURRICULUM: &str = "advance_curriculum";
pub const SET_DROPOUT_PROPORTION: &str = "set_dropout_proportion";
pub const SEED: &str = "seed";
pub const SET_LEVEL_DISTRIBUTION: &str = "set_level_distribution";
pub const RENDER: &str = "render";
pub const CLOSE: &str = "close";

/// Untyped request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<A, T> {
    Empty,
    Actions(Vec<A>),
    Task(Option<T>),
    Proportion(f64),
    Seed(u64),
    Index(usize),
    Mode(RenderMode),
}

impl<A, T> Payload<A, T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Actions(_) => "actions",
            Payload::Task(_) => "task",
            Payload::Proportion(_) => "proportion",
            Payload::Seed(_) => "seed",
            Payload::Index(_) => "index",
            Payload::Mode(_) => "mode",
        }
    }
}

/// A `(command_name, payload)` pair as sent to a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<A, T> {
    pub name: String,
    pub payload: Payload<A, T>,
}

impl<A, T> Request<A, T> {
    pub fn new(name: impl Into<String>, payload: Payload<A, T>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Decoded worker command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<A, T> {
    Step(Vec<A>),
    Reset,
    SetTask(Option<T>),
    AdvanceCurriculum,
    SetDropoutProportion(f64),
    Seed(u64),
    SetLevelDistribution(usize),
    Render(RenderMode),
    Close,
}

impl<A, T> Command<A, T> {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Step(_) => STEP,
            Command::Reset => RESET,
            Command::SetTask(_) => SET_TASK,
            Command::AdvanceCurriculum => ADVANCE_CURRICULUM,
            Command::SetDropoutProportion(_) => SET_DROPOUT_PROPORTION,
            Command::Seed(_) => SEED,
            Command::SetLevelDistribution(_) => SET_LEVEL_DISTRIBUTION,
            Command::Render(_) => RENDER,
            Command::Close => CLOSE,
        }
    }

    /// Encode into the wire form.
    pub fn into_request(self) -> Request<A, T> {
        let name = self.name();
        let payload = match self {
            Command::Step(actions) => Payload::Actions(actions),
            Command::SetTask(task) => Payload::Task(task),
            Command::SetDropoutProportion(p) => Payload::Proportion(p),
            Command::Seed(seed) => Payload::Seed(seed),
            Command::SetLevelDistribution(index) => Payload::Index(index),
            Command::Render(mode) => Payload::Mode(mode),
            Command::Reset | Command::AdvanceCurriculum | Command::Close => Payload::Empty,
        };
        Request::new(name, payload)
    }
}

impl<A, T> TryFrom<Request<A, T>> for Command<A, T> {
    type Error = ProtocolError;

    fn try_from(request: Request<A, T>) -> Result<Self, Self::Error> {
        let Request { name, payload } = request;

        let command = match (name.as_str(), payload) {
            (STEP, Payload::Actions(actions)) => Command::Step(actions),
            (RESET, Payload::Empty) => Command::Reset,
            (SET_TASK, Payload::Task(task)) => Command::SetTask(task),
            (ADVANCE_CURRICULUM, Payload::Empty) => Command::AdvanceCurriculum,
            (SET_DROPOUT_PROPORTION, Payload::Proportion(p)) => Command::SetDropoutProportion(p),
            (SEED, Payload::Seed(seed)) => Command::Seed(seed),
            (SET_LEVEL_DISTRIBUTION, Payload::Index(index)) => Command::SetLevelDistribution(index),
            (RENDER, Payload::Mode(mode)) => Command::Render(mode),
            (CLOSE, Payload::Empty) => Command::Close,
            (other, payload) => {
                return Err(match expected_payload(other) {
                    Some((command, expected)) => ProtocolError::PayloadMismatch {
                        command,
                        expected,
                        actual: payload.kind(),
                    },
                    None => ProtocolError::UnknownCommand {
                        name: other.to_string(),
                    },
                })
            }
        };

        Ok(command)
    }
}

/// Canonical name and expected payload kind for a known command.
fn expected_payload(name: &str) -> Option<(&'static str, &'static str)> {
    let entry = match name {
        STEP => (STEP, "actions"),
        RESET => (RESET, "empty"),
        SET_TASK => (SET_TASK, "task"),
        ADVANCE_CURRICULUM => (ADVANCE_CURRICULUM, "empty"),
        SET_DROPOUT_PROPORTION => (SET_DROPOUT_PROPORTION, "proportion"),
        SEED => (SEED, "seed"),
        SET_LEVEL_DISTRIBUTION => (SET_LEVEL_DISTRIBUTION, "index"),
        RENDER => (RENDER, "mode"),
        CLOSE => (CLOSE, "empty"),
        _ => return None,
    };
    Some(entry)
}

/// Worker reply.
#[derive(Debug, Clone)]
pub enum Reply<O, F> {
    Step(StepBatch<O>),
    Observations(Vec<O>),
    Frames(Vec<F>),
    Ack,
}

impl<O, F> Reply<O, F> {
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Step(_) => "step",
            Reply::Observations(_) => "observations",
            Reply::Frames(_) => "frames",
            Reply::Ack => "ack",
        }
    }

    pub fn into_step(self) -> Result<StepBatch<O>, ProtocolError> {
        match self {
            Reply::Step(batch) => Ok(batch),
            other => Err(unexpected(STEP, &other)),
        }
    }

    pub fn into_observations(self) -> Result<Vec<O>, ProtocolError> {
        match self {
            Reply::Observations(obs) => Ok(obs),
            other => Err(unexpected(RESET, &other)),
        }
    }

    pub fn into_frames(self) -> Result<Vec<F>, ProtocolError> {
        match self {
            Reply::Frames(frames) => Ok(frames),
            other => Err(unexpected(RENDER, &other)),
        }
    }

    pub fn into_ack(self, command: &'static str) -> Result<(), ProtocolError> {
        match self {
            Reply::Ack => Ok(()),
            other => Err(unexpected(command, &other)),
        }
    }
}

fn unexpected<O, F>(command: &'static str, reply: &Reply<O, F>) -> ProtocolError {
    ProtocolError::UnexpectedReply {
        command,
        reply: reply.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestCommand = Command<u32, u32>;

    #[test]
    fn test_commands_survive_wire_encoding() {
        let commands: Vec<TestCommand> = vec![
            Command::Step(vec![1, 2]),
            Command::Reset,
            Command::SetTask(Some(7)),
            Command::SetTask(None),
            Command::AdvanceCurriculum,
            Command::SetDropoutProportion(0.25),
            Command::Seed(11),
            Command::SetLevelDistribution(3),
            Command::Render(RenderMode::RgbArray),
            Command::Close,
        ];

        for command in commands {
            let request = command.clone().into_request();
            assert_eq!(request.name, command.name());
            assert_eq!(TestCommand::try_from(request), Ok(command));
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let request: Request<u32, u32> = Request::new("noop", Payload::Empty);

        let error = TestCommand::try_from(request).unwrap_err();

        assert_eq!(
            error,
            ProtocolError::UnknownCommand {
                name: "noop".to_string()
            }
        );
    }

    #[test]
    fn test_wrong_payload_is_rejected() {
        let request: Request<u32, u32> = Request::new(STEP, Payload::Seed(3));

        let error = TestCommand::try_from(request).unwrap_err();

        assert_eq!(
            error,
            ProtocolError::PayloadMismatch {
                command: STEP,
                expected: "actions",
                actual: "seed",
            }
        );
    }

    #[test]
    fn test_reply_kind_checks() {
        let ack: Reply<u32, ()> = Reply::Ack;
        assert!(ack.clone().into_ack(SEED).is_ok());
        assert_eq!(
            ack.into_observations().unwrap_err(),
            ProtocolError::UnexpectedReply {
                command: RESET,
                reply: "ack"
            }
        );
    }
}
