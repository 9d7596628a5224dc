//! Thin façade over intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! Handles are **waitable**; callers `.wait()` before they trust that a
//! receive buffer is ready.
//!
//! The collective methods on [`Communicator`] are built from point-to-point
//! messages by default. Every rank of the communicator must call them in the
//! same order with the same tag, or the group blocks forever.

use crate::algs::wire::{WireCount, cast_slice, cast_slice_mut};
use crate::mesh_error::MeshError;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Message tag. Collectives use `tag` and `tag.offset(1)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }
    pub const fn as_u16(self) -> u16 {
        self.0
    }
    pub const fn offset(self, n: u16) -> Self {
        Self(self.0.wrapping_add(n))
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Point-to-point messaging plus the collectives built on it.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive of at most `buf.len()` bytes.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// True for the serial stand-in.
    fn is_no_comm(&self) -> bool {
        false
    }

    /// Every rank's `local` bytes, indexed by rank. Collective.
    fn all_gather_bytes(&self, tag: CommTag, local: &[u8]) -> Result<Vec<Vec<u8>>, MeshError> {
        all_gather_p2p(self, tag, local)
    }

    /// Minimum of `value` over all ranks. Collective.
    fn all_reduce_min_i32(&self, tag: CommTag, value: i32) -> Result<i32, MeshError> {
        let all = self.all_gather_bytes(tag, &value.to_le_bytes())?;
        decode_each(&all, i32::from_le_bytes).map(|v| v.into_iter().min().unwrap_or(value))
    }

    /// Maximum of `value` over all ranks. Collective.
    fn all_reduce_max_u64(&self, tag: CommTag, value: u64) -> Result<u64, MeshError> {
        let all = self.all_gather_bytes(tag, &value.to_le_bytes())?;
        decode_each(&all, u64::from_le_bytes).map(|v| v.into_iter().max().unwrap_or(value))
    }

    /// Block until every rank has arrived. Collective.
    fn barrier(&self, tag: CommTag) -> Result<(), MeshError> {
        self.all_gather_bytes(tag, &[]).map(|_| ())
    }
}

fn decode_each<const N: usize, T>(
    all: &[Vec<u8>],
    from_le: fn([u8; N]) -> T,
) -> Result<Vec<T>, MeshError> {
    all.iter()
        .enumerate()
        .map(|(rank, bytes)| {
            <[u8; N]>::try_from(bytes.as_slice())
                .map(from_le)
                .map_err(|_| MeshError::CommError {
                    neighbor: rank,
                    reason: format!("expected {N} bytes, got {}", bytes.len()),
                })
        })
        .collect()
}

/// All-gather from point-to-point messages: sizes on `tag`, payloads on
/// `tag + 1`. Every send handle is drained before returning, even on error.
fn all_gather_p2p<C: Communicator + ?Sized>(
    comm: &C,
    tag: CommTag,
    local: &[u8],
) -> Result<Vec<Vec<u8>>, MeshError> {
    let me = comm.rank();
    let n = comm.size();
    let size_tag = tag.as_u16();
    let data_tag = tag.offset(1).as_u16();
    let peers: Vec<usize> = (0..n).filter(|&p| p != me).collect();

    // 1) announce our size and payload to every peer
    let count = WireCount::new(local.len());
    let mut pending_sends = Vec::with_capacity(2 * peers.len());
    for &peer in &peers {
        pending_sends.push(comm.isend(peer, size_tag, cast_slice(std::slice::from_ref(&count))));
        pending_sends.push(comm.isend(peer, data_tag, local));
    }

    // 2) receive sizes, then payloads (but do not early-return)
    let mut out = vec![Vec::new(); n];
    if let Some(slot) = out.get_mut(me) {
        *slot = local.to_vec();
    }
    let mut maybe_err = None;
    for &peer in &peers {
        let mut cnt = WireCount::new(0);
        let h = comm.irecv(
            peer,
            size_tag,
            cast_slice_mut(std::slice::from_mut(&mut cnt)),
        );
        let len = match h.wait() {
            Some(data) if data.len() == std::mem::size_of::<WireCount>() => {
                cast_slice_mut(std::slice::from_mut(&mut cnt)).copy_from_slice(&data);
                cnt.get()
            }
            other => {
                maybe_err.get_or_insert(MeshError::CommError {
                    neighbor: peer,
                    reason: match other {
                        Some(data) => format!(
                            "expected {} bytes for size header, got {}",
                            std::mem::size_of::<WireCount>(),
                            data.len()
                        ),
                        None => format!("failed to receive size from rank {peer}"),
                    },
                });
                0
            }
        };
        let mut buf = vec![0u8; len];
        let h = comm.irecv(peer, data_tag, &mut buf);
        match h.wait() {
            Some(data) if data.len() == len => out[peer] = data,
            Some(data) => {
                maybe_err.get_or_insert(MeshError::CommError {
                    neighbor: peer,
                    reason: format!("expected {len} payload bytes, got {}", data.len()),
                });
            }
            None if len > 0 => {
                maybe_err.get_or_insert(MeshError::CommError {
                    neighbor: peer,
                    reason: format!("failed to receive payload from rank {peer}"),
                });
            }
            None => {}
        }
    }

    // 3) always drain all send handles before returning
    for send in pending_sends {
        let _ = send.wait();
    }

    match maybe_err {
        Some(err) => Err(err),
        None => Ok(out),
    }
}

/// Compile-time no-op comm for pure serial use: rank 0 of 1.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- ThreadComm: ranks simulated by threads of one process ---
type Key = (usize, usize, u16); // (src, dst, tag)
type Mailbox = DashMap<Key, VecDeque<Bytes>>;

/// One rank of an in-process world. Messages between a (src, dst, tag)
/// triple are delivered in send order.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
}

impl ThreadComm {
    /// `size` ranks sharing one private mailbox.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::new());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }
}

pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    len: usize,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        loop {
            if let Some(mut queue) = self.mailbox.get_mut(&self.key) {
                if let Some(bytes) = queue.pop_front() {
                    let n = bytes.len().min(self.len);
                    return Some(bytes[..n].to_vec());
                }
            }
            std::thread::yield_now();
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        self.mailbox
            .entry((self.rank, peer, tag))
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            len: buf.len(),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::Count;
    use mpi::collective::SystemOperation;
    use mpi::datatype::PartitionMut;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// The MPI world communicator. Collectives map onto native MPI calls.
    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, MeshError> {
            let universe = mpi::initialize().ok_or_else(|| MeshError::CommError {
                neighbor: 0,
                reason: "MPI is already initialized".into(),
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// A completed transfer; receives carry their data.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let (mut data, _status) = self
                .world
                .process_at_rank(peer as i32)
                .receive_vec_with_tag::<u8>(i32::from(tag));
            data.truncate(buf.len());
            MpiHandle(Some(data))
        }

        fn all_gather_bytes(
            &self,
            _tag: CommTag,
            local: &[u8],
        ) -> Result<Vec<Vec<u8>>, MeshError> {
            let local_len = local.len() as Count;
            let mut counts = vec![0 as Count; self.size];
            self.world.all_gather_into(&local_len, &mut counts[..]);
            let displs: Vec<Count> = counts
                .iter()
                .scan(0 as Count, |acc, &c| {
                    let d = *acc;
                    *acc += c;
                    Some(d)
                })
                .collect();
            let total: Count = counts.iter().sum();
            let mut buf = vec![0u8; total as usize];
            {
                let mut partition = PartitionMut::new(&mut buf[..], &counts[..], &displs[..]);
                self.world.all_gather_varcount_into(local, &mut partition);
            }
            Ok(counts
                .iter()
                .zip(&displs)
                .map(|(&c, &d)| buf[d as usize..(d + c) as usize].to_vec())
                .collect())
        }

        fn all_reduce_min_i32(&self, _tag: CommTag, value: i32) -> Result<i32, MeshError> {
            let mut out = value;
            self.world
                .all_reduce_into(&value, &mut out, SystemOperation::min());
            Ok(out)
        }

        fn all_reduce_max_u64(&self, _tag: CommTag, value: u64) -> Result<u64, MeshError> {
            let mut out = value;
            self.world
                .all_reduce_into(&value, &mut out, SystemOperation::max());
            Ok(out)
        }

        fn barrier(&self, _tag: CommTag) -> Result<(), MeshError> {
            self.world.barrier();
            Ok(())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_roundtrip_two_ranks() {
        let world = ThreadComm::world(2);
        let (comm0, comm1) = (&world[0], &world[1]);

        let send_handle = comm0.isend(1, 7, &[1, 2, 3, 4]);
        send_handle.wait();

        let mut recv_buf = [0u8; 4];
        let data = comm1
            .irecv(0, 7, &mut recv_buf)
            .wait()
            .expect("Expected to receive data from rank 0");
        recv_buf.copy_from_slice(&data);
        assert_eq!(&recv_buf, &[1, 2, 3, 4]);
    }

    #[test]
    fn worlds_are_isolated() {
        let a = ThreadComm::world(2);
        let b = ThreadComm::world(2);
        a[0].isend(1, 1, &[1]);
        b[0].isend(1, 1, &[2]);
        let mut buf = [0u8; 1];
        assert_eq!(b[1].irecv(0, 1, &mut buf).wait(), Some(vec![2]));
        assert_eq!(a[1].irecv(0, 1, &mut buf).wait(), Some(vec![1]));
    }

    #[test]
    fn no_comm_collectives_are_local() {
        let comm = NoComm;
        assert_eq!(
            comm.all_gather_bytes(CommTag(1), b"abc").unwrap(),
            vec![b"abc".to_vec()]
        );
        assert_eq!(comm.all_reduce_min_i32(CommTag(1), -3).unwrap(), -3);
        assert_eq!(comm.all_reduce_max_u64(CommTag(1), 9).unwrap(), 9);
        assert!(comm.barrier(CommTag(1)).is_ok());
    }
}
