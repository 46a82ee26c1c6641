//! Dispatcher Tests
//!
//! The request/response cycle against a mocked database.

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use mysqlport::config::{Config, StringMode, TransactionMode};
use mysqlport::database::{DatabaseError, QueryResult};
use mysqlport::term::Term;
use mysqlport::{Dispatcher, PortError};

use super::mock::{requests, responses, FlushCounter, LockstepReader, MockDatabase};

fn query(sql: &str) -> Term {
    Term::tuple(vec![Term::atom("sql_query"), Term::string(sql)])
}

fn tagged(tag: &str) -> Term {
    Term::tuple(vec![Term::atom(tag)])
}

/// Serve `terms` to completion; returns the outcome, replies and database
fn serve(
    terms: &[Term],
    database: MockDatabase,
    config: &Config,
) -> (Result<u64, PortError>, Vec<Term>, MockDatabase) {
    let mut dispatcher = Dispatcher::new(
        Cursor::new(requests(terms)),
        Vec::new(),
        database,
        config,
    );
    let outcome = dispatcher.run();
    let (_, written, database) = dispatcher.into_parts();
    (outcome, responses(&written), database)
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_selected_result() {
    let database = MockDatabase::with_results(vec![QueryResult::Selected {
        columns: vec![b"id".to_vec(), b"name".to_vec()],
        rows: vec![
            vec![Some(b"1".to_vec()), Some(b"a".to_vec())],
            vec![Some(b"2".to_vec()), Some(b"b".to_vec())],
        ],
    }]);

    let (outcome, replies, database) =
        serve(&[query("select id, name from t")], database, &Config::default());

    assert_eq!(outcome.unwrap(), 1);
    assert_eq!(database.executed, vec![b"select id, name from t".to_vec()]);
    assert_eq!(
        replies,
        vec![Term::tuple(vec![
            Term::atom("selected"),
            Term::list(vec![Term::string("id"), Term::string("name")]),
            Term::list(vec![
                Term::tuple(vec![Term::string("1"), Term::string("a")]),
                Term::tuple(vec![Term::string("2"), Term::string("b")]),
            ]),
        ])]
    );
}

#[test]
fn test_affected_rows_result() {
    let database = MockDatabase::with_results(vec![QueryResult::AffectedRowCount(3)]);
    let (outcome, replies, _) = serve(
        &[query("update t set x = 1")],
        database,
        &Config::default(),
    );

    assert!(outcome.is_ok());
    assert_eq!(
        replies,
        vec![Term::tuple(vec![Term::atom("num_rows"), Term::Integer(3)])]
    );
}

#[test]
fn test_database_error_is_not_fatal() {
    let database = MockDatabase::with_results(vec![
        QueryResult::DatabaseError(DatabaseError::new(1064, "syntax error")),
        QueryResult::AffectedRowCount(1),
    ]);
    let (outcome, replies, _) = serve(
        &[query("selec 1"), query("insert into t values (1)")],
        database,
        &Config::default(),
    );

    assert_eq!(outcome.unwrap(), 2);
    assert_eq!(
        replies,
        vec![
            Term::tuple(vec![
                Term::atom("error"),
                Term::tuple(vec![
                    Term::atom("mysql_error"),
                    Term::Integer(1064),
                    Term::string("syntax error"),
                ]),
            ]),
            Term::tuple(vec![Term::atom("num_rows"), Term::Integer(1)]),
        ]
    );
}

#[test]
fn test_query_text_as_iolist() {
    let command = Term::tuple(vec![
        Term::atom("sql_query"),
        Term::list(vec![Term::binary("select "), Term::string("1")]),
    ]);
    let (_, _, database) = serve(&[command], MockDatabase::default(), &Config::default());
    assert_eq!(database.executed, vec![b"select 1".to_vec()]);
}

#[test]
fn test_binary_string_mode() {
    let database = MockDatabase::with_results(vec![QueryResult::Selected {
        columns: vec![b"n".to_vec()],
        rows: vec![vec![Some(b"7".to_vec())], vec![None]],
    }]);
    let config = Config::builder().string_mode(StringMode::Binary).build();
    let (_, replies, _) = serve(&[query("select n from t")], database, &config);

    assert_eq!(
        replies[0].to_string(),
        r#"{selected,[<<"n">>],[{<<"7">>},{null}]}"#
    );
}

// =============================================================================
// Transaction Command Tests
// =============================================================================

#[test]
fn test_commit_rollback_acknowledged_only() {
    let (outcome, replies, database) = serve(
        &[tagged("sql_commit"), tagged("sql_rollback")],
        MockDatabase::default(),
        &Config::default(),
    );

    assert_eq!(outcome.unwrap(), 2);
    assert!(database.executed.is_empty());
    assert_eq!(
        replies,
        vec![
            Term::tuple(vec![Term::atom("ok"), Term::atom("commit")]),
            Term::tuple(vec![Term::atom("ok"), Term::atom("rollback")]),
        ]
    );
}

#[test]
fn test_commit_rollback_forwarded() {
    let config = Config::builder()
        .transaction_mode(TransactionMode::Forward)
        .build();
    let (_, replies, database) = serve(
        &[tagged("sql_commit"), tagged("sql_rollback")],
        MockDatabase::default(),
        &config,
    );

    assert_eq!(
        database.executed,
        vec![b"COMMIT".to_vec(), b"ROLLBACK".to_vec()]
    );
    assert_eq!(replies[0].to_string(), "{ok,commit}");
    assert_eq!(replies[1].to_string(), "{ok,rollback}");
}

#[test]
fn test_forwarded_commit_failure_reported() {
    let config = Config::builder()
        .transaction_mode(TransactionMode::Forward)
        .build();
    let database = MockDatabase::with_results(vec![QueryResult::DatabaseError(
        DatabaseError::new(2006, "MySQL server has gone away"),
    )]);
    let (outcome, replies, _) = serve(&[tagged("sql_commit")], database, &config);

    assert!(outcome.is_ok());
    assert_eq!(
        replies[0].to_string(),
        r#"{error,{mysql_error,2006,"MySQL server has gone away"}}"#
    );
}

// =============================================================================
// Fatal Error Tests
// =============================================================================

#[test]
fn test_unknown_command_is_fatal_without_reply() {
    let (outcome, replies, _) = serve(
        &[tagged("sql_drop_table")],
        MockDatabase::default(),
        &Config::default(),
    );

    let err = outcome.unwrap_err();
    assert!(matches!(err, PortError::UnknownCommand(ref tag) if tag == "sql_drop_table"));
    assert_eq!(err.exit_code(), 3);
    assert!(replies.is_empty());
}

#[test]
fn test_unknown_command_stops_the_loop() {
    let (outcome, replies, database) = serve(
        &[query("select 1"), tagged("sql_drop_table"), query("select 2")],
        MockDatabase::default(),
        &Config::default(),
    );

    assert!(outcome.is_err());
    assert_eq!(replies.len(), 1);
    assert_eq!(database.executed, vec![b"select 1".to_vec()]);
}

#[test]
fn test_undecodable_payload_is_fatal() {
    let mut input = Vec::new();
    mysqlport::protocol::write_frame(&mut input, &[131, 255]).unwrap();

    let mut dispatcher = Dispatcher::new(
        Cursor::new(input),
        Vec::new(),
        MockDatabase::default(),
        &Config::default(),
    );
    let err = dispatcher.run().unwrap_err();
    assert!(matches!(err, PortError::Decode(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_truncated_frame_is_fatal() {
    let mut input = requests(&[tagged("sql_commit")]);
    input.truncate(input.len() - 1);

    let mut dispatcher = Dispatcher::new(
        Cursor::new(input),
        Vec::new(),
        MockDatabase::default(),
        &Config::default(),
    );
    let err = dispatcher.run().unwrap_err();
    assert!(matches!(err, PortError::Transport(_)));
    assert_eq!(dispatcher.served(), 0);
}

#[test]
fn test_oversized_frame_is_fatal() {
    let config = Config::builder().max_frame_size(8).build();
    let (outcome, replies, database) = serve(
        &[query("select * from a_rather_long_table_name")],
        MockDatabase::default(),
        &config,
    );

    assert!(matches!(outcome, Err(PortError::Transport(_))));
    assert!(replies.is_empty());
    assert!(database.executed.is_empty());
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_empty_input_serves_nothing() {
    let (outcome, replies, _) = serve(&[], MockDatabase::default(), &Config::default());
    assert_eq!(outcome.unwrap(), 0);
    assert!(replies.is_empty());
}

#[test]
fn test_responses_in_order_and_lockstep() {
    let terms: Vec<Term> = (0..10)
        .map(|i| {
            if i % 4 == 3 {
                tagged("sql_commit")
            } else {
                query(&format!("insert into t values ({})", i))
            }
        })
        .collect();
    let results = (0..10).map(QueryResult::AffectedRowCount).collect();

    let flushed = Rc::new(Cell::new(0));
    let mut dispatcher = Dispatcher::new(
        LockstepReader::new(&terms, Rc::clone(&flushed)),
        FlushCounter::new(Rc::clone(&flushed)),
        MockDatabase::with_results(results),
        &Config::default(),
    );
    assert_eq!(dispatcher.run().unwrap(), 10);
    assert_eq!(flushed.get(), 10);

    let (_, writer, _) = dispatcher.into_parts();
    let replies = responses(&writer.data);
    assert_eq!(replies.len(), 10);

    // Queries consume canned counts 0, 1, 2, ... in order; commits take none
    let mut next_count = 0;
    for (i, reply) in replies.iter().enumerate() {
        if i % 4 == 3 {
            assert_eq!(reply.to_string(), "{ok,commit}");
        } else {
            assert_eq!(reply.to_string(), format!("{{num_rows,{}}}", next_count));
            next_count += 1;
        }
    }
}
