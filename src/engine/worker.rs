// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker threads for the parallel executor.
//!
//! Each worker is a named OS thread that exclusively owns one [`SlotShard`].
//! It blocks on its inbox, decodes each [`Request`] into a [`Command`], runs
//! it against the shard and answers on the oneshot channel that travelled
//! with the request. The inbox is FIFO and the worker handles one request at
//! a time, so replies always come back in request order.
//!
//! A request the worker cannot decode is fatal: the worker drops the reply
//! channel without answering and its thread ends with the protocol error.
//! Simulator failures are answered as errors and the worker keeps serving.

use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::engine::protocol::{Command, Reply, Request};
use crate::engine::slot::SlotShard;
use crate::errors::ExecutorError;
use crate::observability::messages::engine::{
    WorkerCommandFailed, WorkerCrashed, WorkerSpawned, WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Environment;

pub(crate) type WorkerReply<E> =
    Reply<<E as Environment>::Observation, <E as Environment>::Frame>;
pub(crate) type WorkerRequest<E> = Request<<E as Environment>::Action, <E as Environment>::Task>;
pub(crate) type PendingReply<E> = oneshot::Receiver<Result<WorkerReply<E>, ExecutorError>>;

/// A request paired with the channel its reply goes back on.
pub(crate) struct Envelope<E: Environment> {
    request: WorkerRequest<E>,
    reply_to: oneshot::Sender<Result<WorkerReply<E>, ExecutorError>>,
}

/// Orchestrator-side handle to one worker thread.
///
/// Dropping a handle that was not shut down sends `close` so the thread
/// exits once it drains its inbox; the thread itself is detached.
pub(crate) struct WorkerHandle<E: Environment> {
    index: usize,
    sender: mpsc::UnboundedSender<Envelope<E>>,
    thread: Option<thread::JoinHandle<Result<(), ExecutorError>>>,
}

impl<E: Environment> WorkerHandle<E> {
    /// Start worker `index` owning `slots` clones of `template`.
    pub fn spawn(
        index: usize,
        template: &E,
        slots: usize,
        max_path_length: usize,
        seed: u64,
    ) -> Result<Self, ExecutorError> {
        let shard = SlotShard::new(template, slots, max_path_length, seed);
        let (sender, inbox) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name(format!("rollout-worker-{}", index))
            .spawn(move || serve(index, seed, shard, inbox))
            .map_err(|source| ExecutorError::Spawn {
                worker: index,
                source,
            })?;

        WorkerSpawned {
            worker: index,
            slots,
            seed,
        }
        .log();

        Ok(Self {
            index,
            sender,
            thread: Some(thread),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Queue `request` and return the receiver its reply will arrive on.
    pub fn dispatch(&self, request: WorkerRequest<E>) -> Result<PendingReply<E>, ExecutorError> {
        let (reply_to, pending) = oneshot::channel();
        self.sender
            .send(Envelope { request, reply_to })
            .map_err(|_| ExecutorError::WorkerDisconnected { worker: self.index })?;
        Ok(pending)
    }

    /// Send `request` and wait for its reply.
    #[cfg(test)]
    pub async fn call(&self, request: WorkerRequest<E>) -> Result<WorkerReply<E>, ExecutorError> {
        let pending = self.dispatch(request)?;
        self.receive(pending).await
    }

    /// Wait for a previously dispatched reply.
    pub async fn receive(&self, pending: PendingReply<E>) -> Result<WorkerReply<E>, ExecutorError> {
        pending
            .await
            .map_err(|_| ExecutorError::WorkerDisconnected { worker: self.index })?
    }

    /// Send `close` and wait for the thread to exit, returning the error it
    /// terminated with, if any.
    pub async fn shutdown(mut self) -> Result<(), ExecutorError> {
        let worker = self.index;
        self.send_close();

        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) | Err(_) => Err(ExecutorError::WorkerPanicked { worker }),
        }
    }

    fn send_close(&self) {
        let (reply_to, _) = oneshot::channel();
        // A worker that already exited has nothing left to close.
        let _ = self.sender.send(Envelope {
            request: Command::Close.into_request(),
            reply_to,
        });
    }
}

impl<E: Environment> Drop for WorkerHandle<E> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.send_close();
        }
    }
}

/// Worker thread body.
fn serve<E: Environment>(
    index: usize,
    seed: u64,
    mut shard: SlotShard<E>,
    mut inbox: mpsc::UnboundedReceiver<Envelope<E>>,
) -> Result<(), ExecutorError> {
    let span = WorkerSpawned {
        worker: index,
        slots: shard.len(),
        seed,
    }
    .span("serve");
    let _entered = span.enter();
    let mut commands_served = 0u64;

    while let Some(Envelope { request, reply_to }) = inbox.blocking_recv() {
        let command = match Command::try_from(request) {
            Ok(command) => command,
            Err(error) => {
                WorkerCrashed {
                    worker: index,
                    error: &error,
                }
                .log();
                return Err(error.into());
            }
        };

        let name = command.name();
        let outcome = match execute(&mut shard, command) {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => break,
            Err(error) => {
                WorkerCommandFailed {
                    worker: index,
                    command: name,
                    error: &error,
                }
                .log();
                Err(error)
            }
        };

        commands_served += 1;
        // The orchestrator may have stopped waiting after an earlier failure.
        let _ = reply_to.send(outcome);
    }

    WorkerStopped {
        worker: index,
        commands_served,
    }
    .log();
    Ok(())
}

/// Run one command against the shard. `None` means the worker should stop.
fn execute<E: Environment>(
    shard: &mut SlotShard<E>,
    command: Command<E::Action, E::Task>,
) -> Result<Option<WorkerReply<E>>, ExecutorError> {
    let reply = match command {
        Command::Step(actions) => Reply::Step(shard.step(&actions)?),
        Command::Reset => Reply::Observations(shard.reset()?),
        Command::SetTask(task) => {
            shard.set_task(task);
            Reply::Ack
        }
        Command::AdvanceCurriculum => {
            shard.advance_curriculum();
            Reply::Ack
        }
        Command::SetDropoutProportion(proportion) => {
            shard.set_dropout_proportion(proportion);
            Reply::Ack
        }
        Command::Seed(seed) => {
            shard.seed(seed);
            Reply::Ack
        }
        Command::SetLevelDistribution(index) => {
            shard.set_level_distribution(index);
            Reply::Ack
        }
        Command::Render(mode) => Reply::Frames(shard.render(mode)),
        Command::Close => return Ok(None),
    };
    Ok(Some(reply))
}
