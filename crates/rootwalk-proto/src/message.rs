//! Complete DNS messages.

use crate::error::{Error, Result};
use crate::header::{HEADER_SIZE, Header, HeaderFlags, SectionCounts};
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::ResourceRecord;
use crate::rrset::Rrset;
use crate::wire::WireReader;
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS message: header, question, and the three record sections.
///
/// Iterative queries carry no OPT record; an OPT record received in the
/// additional section is kept as an ordinary opaque record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    header: Header,
    questions: Vec<Question>,
    answers: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    additional: Vec<ResourceRecord>,
}

impl Message {
    /// Creates an empty message with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    /// Creates a non-recursive query for `question` with a random ID.
    pub fn iterative_query(question: Question) -> Self {
        let mut msg = Self::new(Header::iterative_query());
        msg.questions.push(question);
        msg
    }

    /// Creates an empty response echoing the ID and question of `query`.
    pub fn response_to(query: &Message) -> Self {
        Self {
            header: Header::response_to(&query.header),
            questions: query.questions.clone(),
            ..Self::default()
        }
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the message ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.header.rcode = rcode;
    }

    /// Returns true for a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Returns true if the TC bit is set.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.header.is_truncated()
    }

    /// Returns true if the RD bit is set.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.header.recursion_desired()
    }

    /// Returns true if the rcode is NXDOMAIN.
    #[inline]
    pub fn is_nxdomain(&self) -> bool {
        self.header.rcode.is_nxdomain()
    }

    /// Marks the message authoritative or not.
    #[inline]
    pub fn set_authoritative(&mut self, aa: bool) {
        self.header.set_flag(HeaderFlags::AA, aa);
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Returns the first question.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns all questions.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section.
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Groups the answer section into RRsets.
    pub fn answer_rrsets(&self) -> Vec<Rrset> {
        Rrset::group(&self.answers)
    }

    /// Groups the authority section into RRsets.
    pub fn authority_rrsets(&self) -> Vec<Rrset> {
        Rrset::group(&self.authority)
    }

    /// Groups the additional section into RRsets.
    pub fn additional_rrsets(&self) -> Vec<Rrset> {
        Rrset::group(&self.additional)
    }

    /// Appends an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
    }

    /// Appends an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
    }

    /// Appends an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Decodes a message from a datagram.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (header, counts) = Header::parse(data)?;
        let mut reader = WireReader::at(data, HEADER_SIZE);

        let questions = (0..counts.questions)
            .map(|_| Question::read(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        let mut section = |count: u16| {
            (0..count)
                .map(|_| ResourceRecord::read(&mut reader))
                .collect::<Result<Vec<_>>>()
        };
        let answers = section(counts.answers)?;
        let authority = section(counts.authority)?;
        let additional = section(counts.additional)?;

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
        })
    }

    /// Encodes the message without name compression.
    pub fn to_wire(&self) -> Bytes {
        let counts = SectionCounts {
            questions: self.questions.len() as u16,
            answers: self.answers.len() as u16,
            authority: self.authority.len() as u16,
            additional: self.additional.len() as u16,
        };

        let mut buf = BytesMut::with_capacity(crate::MAX_UDP_MESSAGE_SIZE);
        self.header.write_to(counts, &mut buf);
        for q in &self.questions {
            q.write_to(&mut buf);
        }
        for r in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            r.write_to(&mut buf);
        }
        buf.freeze()
    }

    /// Checks that `self` answers `query`: same ID, same question.
    pub fn check_answers(&self, query: &Message) -> Result<()> {
        if self.id() != query.id() {
            return Err(Error::invalid_data(
                0,
                format!("response id {} does not match query id {}", self.id(), query.id()),
            ));
        }
        match (self.question(), query.question()) {
            (Some(got), Some(asked)) if got.matches(asked) => Ok(()),
            _ => Err(Error::invalid_data(
                HEADER_SIZE,
                "response question does not match query",
            )),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;

        writeln!(f, "\n;; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        for (title, records) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if records.is_empty() {
                continue;
            }
            writeln!(f, "\n;; {title} SECTION:")?;
            for r in records {
                writeln!(f, "{r}")?;
            }
        }
        Ok(())
    }
}
